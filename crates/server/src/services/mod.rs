//! Business logic services.
//!
//! Services sit between route handlers and repositories: handlers parse the
//! wire shapes, services enforce the domain rules, repositories persist.

pub mod auth;
pub mod catalog;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
pub use checkout::CheckoutService;

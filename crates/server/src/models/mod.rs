//! Domain models for the server.
//!
//! These types represent validated domain objects separate from database row
//! types (which live next to their repositories in [`crate::db`]).

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::Order;
pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Address, User};

//! Route handlers.
//!
//! All routes live under `/api` and answer with the JSON envelope
//! `{ "success": bool, "message"?: string, ...payload }`. Errors carry the
//! same envelope with `success: false` plus a real HTTP status code.

pub mod account;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(account::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
}

//! Atelier Server - Storefront and admin JSON API.
//!
//! One axum binary serves both route families under `/api`:
//!
//! - Storefront: catalog reads, cart, checkout, account, wishlist
//! - Admin: product/stock management and order administration
//!
//! # Architecture
//!
//! - Axum handlers returning a uniform `{success, message?, ...}` envelope
//! - `PostgreSQL` via sqlx; embedded arrays (variants, cart lines, order
//!   lines) stored as JSONB documents
//! - Razorpay for payments, Cloudinary for product media (reqwest clients)
//! - tower-sessions (`PostgreSQL`-backed) for the httpOnly session cookie

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cloudinary;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod razorpay;
pub mod routes;
pub mod services;
pub mod state;

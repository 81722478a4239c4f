//! Atelier Core - Shared types and business rules.
//!
//! This crate provides the domain layer used across all Atelier components:
//! - `server` - Storefront and admin JSON API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure business logic - no I/O, no
//! database access, no HTTP clients. Cart totals, order validation, and
//! catalog invariants live here so they can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, money, and statuses
//! - [`cart`] - Cart aggregate: line identity and totals recomputation
//! - [`catalog`] - Color variants, availability checks, media field naming
//! - [`order`] - Canonical order shape, validation, and server-side totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use types::*;

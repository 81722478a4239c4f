//! Razorpay payment gateway client.
//!
//! The checkout flow only needs two calls: create a remote order for an
//! amount, and fetch an order to read its payment status during
//! verification. Amounts cross the wire in paise (integer subunits).

pub mod client;
pub mod types;

pub use client::RazorpayClient;
pub use types::{GatewayOrder, GatewayOrderStatus};

use thiserror::Error;

/// Errors that can occur when interacting with the Razorpay API.
#[derive(Debug, Error)]
pub enum RazorpayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Razorpay rejected the request.
    #[error("Razorpay API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Gateway error description.
        message: String,
    },

    /// An order amount that cannot be expressed in paise.
    #[error("amount not representable in paise: {0}")]
    BadAmount(String),
}

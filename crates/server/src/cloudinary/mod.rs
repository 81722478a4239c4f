//! Cloudinary media upload client.
//!
//! Product media never touches our disk: multipart parts stream in from the
//! admin request and go straight out as signed uploads, and only the
//! returned secure URLs are stored on the variant.

pub mod client;

pub use client::{CloudinaryClient, MediaKind, UploadedMedia};

use thiserror::Error;

/// Errors that can occur when interacting with the Cloudinary API.
#[derive(Debug, Error)]
pub enum CloudinaryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cloudinary rejected the upload.
    #[error("Cloudinary API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the API.
        status: u16,
        /// API error description.
        message: String,
    },
}

//! Integration tests for Atelier.
//!
//! # Running Tests
//!
//! ```bash
//! # Run migrations and start the server
//! cargo run -p atelier-cli -- migrate
//! cargo run -p atelier-server
//!
//! # Run integration tests (ignored by default)
//! cargo test -p atelier-integration-tests -- --ignored
//! ```
//!
//! The tests talk to a running server over HTTP with a cookie-holding
//! reqwest client, registering throwaway accounts as they go.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("ATELIER_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// A cookie-holding client, so the session survives across calls.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a fresh throwaway account and leave its session on the client.
///
/// Returns the registration response body.
///
/// # Panics
///
/// Panics if the request fails or the response isn't the success envelope.
pub async fn register_test_user(client: &Client) -> Value {
    let email = format!("test-{}@example.com", uuid::Uuid::new_v4());

    let resp = client
        .post(format!("{}/api/user/register", base_url()))
        .json(&json!({
            "name": "Test Shopper",
            "email": email,
            "password": "integration-pass",
        }))
        .send()
        .await
        .expect("register request failed");

    assert!(resp.status().is_success(), "register: {}", resp.status());
    let body: Value = resp.json().await.expect("register body not JSON");
    assert_eq!(body["success"], true);
    body
}

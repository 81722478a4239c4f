//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cloudinary::CloudinaryClient;
use crate::config::ServerConfig;
use crate::razorpay::RazorpayClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, configuration, and the
/// payment/media API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    razorpay: RazorpayClient,
    cloudinary: CloudinaryClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let razorpay = RazorpayClient::new(config.razorpay.clone());
        let cloudinary = CloudinaryClient::new(config.cloudinary.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                razorpay,
                cloudinary,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Razorpay API client.
    #[must_use]
    pub fn razorpay(&self) -> &RazorpayClient {
        &self.inner.razorpay
    }

    /// Get a reference to the Cloudinary upload client.
    #[must_use]
    pub fn cloudinary(&self) -> &CloudinaryClient {
        &self.inner.cloudinary
    }
}

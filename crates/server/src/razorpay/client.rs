//! Razorpay REST API client.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::instrument;

use atelier_core::{Money, OrderId};

use super::RazorpayError;
use super::types::{ApiErrorEnvelope, CreateOrderRequest, GatewayOrder};
use crate::config::RazorpayConfig;

/// Razorpay orders API endpoint.
const ORDERS_ENDPOINT: &str = "https://api.razorpay.com/v1/orders";

/// Razorpay REST API client.
///
/// Authenticates with HTTP basic auth (key id / key secret).
#[derive(Clone)]
pub struct RazorpayClient {
    inner: Arc<RazorpayClientInner>,
}

struct RazorpayClientInner {
    client: reqwest::Client,
    config: RazorpayConfig,
}

impl RazorpayClient {
    /// Create a new Razorpay API client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: RazorpayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(RazorpayClientInner { client, config }),
        }
    }

    /// The public key id, handed to the hosted checkout widget.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.inner.config.key_id
    }

    /// Create a gateway order for `total`, receipted with our order id.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::BadAmount` if `total` cannot be expressed in
    /// paise, `RazorpayError::Api` if the gateway rejects the request, and
    /// `RazorpayError::Http` on transport failures.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_order(
        &self,
        order_id: OrderId,
        total: Money,
    ) -> Result<GatewayOrder, RazorpayError> {
        let amount = total
            .to_subunits()
            .ok_or_else(|| RazorpayError::BadAmount(total.to_string()))?;

        let body = CreateOrderRequest {
            amount,
            currency: "INR",
            receipt: order_id.to_string(),
        };

        let response = self
            .inner
            .client
            .post(ORDERS_ENDPOINT)
            .basic_auth(
                &self.inner.config.key_id,
                Some(self.inner.config.key_secret.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Fetch a gateway order by its id ("order_...").
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::Api` if the gateway rejects the request and
    /// `RazorpayError::Http` on transport failures.
    #[instrument(skip(self))]
    pub async fn fetch_order(&self, gateway_order_id: &str) -> Result<GatewayOrder, RazorpayError> {
        let response = self
            .inner
            .client
            .get(format!("{ORDERS_ENDPOINT}/{gateway_order_id}"))
            .basic_auth(
                &self.inner.config.key_id,
                Some(self.inner.config.key_secret.expose_secret()),
            )
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<GatewayOrder, RazorpayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ApiErrorEnvelope>().await {
            Ok(envelope) => envelope
                .error
                .description
                .or(envelope.error.code)
                .unwrap_or_else(|| "unknown gateway error".to_owned()),
            Err(_) => "unknown gateway error".to_owned(),
        };

        Err(RazorpayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

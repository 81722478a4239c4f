//! Razorpay API wire types.

use serde::{Deserialize, Serialize};

/// Request body for creating a gateway order.
#[derive(Debug, Serialize)]
pub struct CreateOrderRequest {
    /// Amount in paise.
    pub amount: i64,
    /// ISO currency code, always "INR" here.
    pub currency: &'static str,
    /// Our own order id, for cross-referencing in the gateway dashboard.
    pub receipt: String,
}

/// Payment status of a gateway order.
///
/// Unknown statuses deserialize to [`GatewayOrderStatus::Other`] so new
/// gateway states never fail verification parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOrderStatus {
    Created,
    Attempted,
    Paid,
    #[serde(other)]
    Other,
}

/// A gateway order as returned by the Razorpay orders API.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id ("order_...").
    pub id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    /// Amount already captured, in paise.
    #[serde(default)]
    pub amount_paid: i64,
    pub status: GatewayOrderStatus,
    /// Our receipt string echoed back.
    #[serde(default)]
    pub receipt: Option<String>,
}

/// Error envelope Razorpay returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_order_deserializes() {
        let json = r#"{
            "id": "order_EKwxwAgItmmXdp",
            "entity": "order",
            "amount": 300000,
            "amount_paid": 300000,
            "amount_due": 0,
            "currency": "INR",
            "receipt": "42",
            "status": "paid",
            "attempts": 1
        }"#;

        let order: GatewayOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 300_000);
        assert_eq!(order.status, GatewayOrderStatus::Paid);
        assert_eq!(order.receipt.as_deref(), Some("42"));
    }

    #[test]
    fn unknown_status_maps_to_other() {
        let json = r#"{"id": "order_x", "amount": 100, "currency": "INR", "status": "on_hold"}"#;
        let order: GatewayOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, GatewayOrderStatus::Other);
    }
}

//! Order domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::order::{OrderAddress, OrderLine, OrderTotals, PaymentDetails};
use atelier_core::{Money, OrderId, OrderStatus, PaymentStatus, UserId};

/// Input for persisting a freshly placed order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    pub totals: OrderTotals,
    pub shipping_address: OrderAddress,
    pub billing_address: Option<OrderAddress>,
    pub payment: PaymentDetails,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
}

/// A placed order in its canonical shape.
///
/// The legacy flat wire fields (`amount`, `payment` boolean) do not exist
/// here; they are normalized away at ingress.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    /// Σ price × quantity, computed server-side.
    pub subtotal: Money,
    /// Flat shipping fee.
    pub shipping: Money,
    /// subtotal + shipping; never taken from client input.
    pub total: Money,
    pub shipping_address: OrderAddress,
    pub billing_address: Option<OrderAddress>,
    pub payment: PaymentDetails,
    pub payment_status: PaymentStatus,
    /// Admin-settable fulfillment status; no transition graph is enforced.
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

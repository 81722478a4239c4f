//! Checkout service: order placement and payment verification.
//!
//! Totals are always recomputed server-side from the validated lines; the
//! client copy of the total is parsed for wire compatibility and discarded.

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use atelier_core::order::{PaymentDetails, PlaceOrderRequest, compute_totals};
use atelier_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use crate::db::OrderRepository;
use crate::error::{ApiError, Result};
use crate::models::order::{NewOrder, Order};
use crate::razorpay::{GatewayOrderStatus, RazorpayClient};

/// Everything the hosted checkout widget needs to collect a payment.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCheckout {
    /// Gateway order id.
    pub gateway_order_id: String,
    /// Amount in paise, as the widget expects.
    pub amount: i64,
    pub currency: String,
    /// Public key id for the widget.
    pub key_id: String,
}

/// Outcome of a payment verification call.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub paid: bool,
    pub order: Order,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
    razorpay: &'a RazorpayClient,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, razorpay: &'a RazorpayClient) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            razorpay,
        }
    }

    /// Place an order paid through the gateway.
    ///
    /// The order is persisted `pending` before the gateway round-trip, so a
    /// gateway failure leaves a pending order rather than a charged customer
    /// with no order row.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::OrderValidation` if the request is malformed and
    /// `ApiError::Razorpay` if the gateway order cannot be created.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn place_razorpay(
        &self,
        user_id: UserId,
        request: PlaceOrderRequest,
    ) -> Result<(Order, GatewayCheckout)> {
        let billing_address = request.billing_address.clone();
        let (items, shipping_address) = request.validate()?;
        let totals = compute_totals(&items);

        let order = self
            .orders
            .create(
                user_id,
                &NewOrder {
                    items,
                    totals,
                    shipping_address,
                    billing_address,
                    payment: PaymentDetails::razorpay(),
                    payment_status: PaymentStatus::Pending,
                    status: OrderStatus::OrderPlaced,
                },
            )
            .await?;

        let gateway_order = self.razorpay.create_order(order.id, order.total).await?;
        self.orders
            .set_gateway_order_id(order.id, &gateway_order.id)
            .await?;

        info!(order_id = %order.id, gateway_order_id = %gateway_order.id, "Order placed");

        let checkout = GatewayCheckout {
            gateway_order_id: gateway_order.id,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            key_id: self.razorpay.key_id().to_owned(),
        };

        let mut order = order;
        order.payment.gateway_order_id = Some(checkout.gateway_order_id.clone());

        Ok((order, checkout))
    }

    /// Place a cash-on-delivery order.
    ///
    /// No gateway round-trip: the order is placed, stock debited, and the
    /// cart cleared in one transaction. Payment stays `pending` until
    /// settled offline.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::OrderValidation` if the request is malformed.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn place_cod(&self, user_id: UserId, request: PlaceOrderRequest) -> Result<Order> {
        let billing_address = request.billing_address.clone();
        let (items, shipping_address) = request.validate()?;
        let totals = compute_totals(&items);

        let order = self
            .orders
            .create_cod(
                user_id,
                &NewOrder {
                    items,
                    totals,
                    shipping_address,
                    billing_address,
                    payment: PaymentDetails::cod(),
                    payment_status: PaymentStatus::Pending,
                    status: OrderStatus::OrderPlaced,
                },
            )
            .await?;

        info!(order_id = %order.id, "COD order placed");

        Ok(order)
    }

    /// Verify payment for an order against the gateway.
    ///
    /// Fetches the gateway order and trusts only its status, never anything
    /// the client asserts. If the gateway says `paid`, the order is marked
    /// paid, stock debited, and the cart cleared in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order doesn't exist, isn't the
    /// caller's, or has no gateway order to verify against.
    #[instrument(skip(self), fields(user_id = %user_id, order_id = %order_id))]
    pub async fn verify(&self, user_id: UserId, order_id: OrderId) -> Result<VerifyOutcome> {
        let order = self
            .orders
            .get_for_user(order_id, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("order {order_id}")))?;

        if order.payment_status == PaymentStatus::Paid {
            return Ok(VerifyOutcome { paid: true, order });
        }

        let gateway_order_id = order
            .payment
            .gateway_order_id
            .as_deref()
            .ok_or_else(|| ApiError::NotFound(format!("order {order_id} has no gateway order")))?;

        let gateway_order = self.razorpay.fetch_order(gateway_order_id).await?;

        if gateway_order.status != GatewayOrderStatus::Paid {
            warn!(
                order_id = %order_id,
                gateway_status = ?gateway_order.status,
                "Payment not confirmed by gateway"
            );
            return Ok(VerifyOutcome { paid: false, order });
        }

        let order = self.orders.confirm_payment(order_id, user_id, None).await?;
        info!(order_id = %order_id, "Payment verified");

        Ok(VerifyOutcome { paid: true, order })
    }
}

//! Order routes: checkout, verification, history, and admin management.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use atelier_core::order::PlaceOrderRequest;
use atelier_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::services::CheckoutService;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/order/place", post(place))
        .route("/api/order/place-cod", post(place_cod))
        .route("/api/order/verify", post(verify))
        .route("/api/order/mine", get(mine))
        .route("/api/order/list", get(list_all))
        .route("/api/order/status", post(set_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    order_id: OrderId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest {
    order_id: OrderId,
    status: OrderStatus,
}

/// Place a gateway-paid order. Responds with the order plus everything the
/// hosted checkout widget needs.
///
/// POST /api/order/place
#[instrument(skip(state, auth, body))]
async fn place(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let service = CheckoutService::new(state.pool(), state.razorpay());
    let (order, checkout) = service.place_razorpay(user.id, body).await?;

    Ok(Json(json!({
        "success": true,
        "order": order,
        "checkout": checkout,
    })))
}

/// Place a cash-on-delivery order.
///
/// POST /api/order/place-cod
#[instrument(skip(state, auth, body))]
async fn place_cod(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let service = CheckoutService::new(state.pool(), state.razorpay());
    let order = service.place_cod(user.id, body).await?;

    Ok(Json(json!({ "success": true, "order": order })))
}

/// Verify an order's payment against the gateway.
///
/// POST /api/order/verify
#[instrument(skip(state, auth, body))]
async fn verify(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<VerifyRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let service = CheckoutService::new(state.pool(), state.razorpay());
    let outcome = service.verify(user.id, body.order_id).await?;

    let message = if outcome.paid {
        "Payment verified"
    } else {
        "Payment not confirmed"
    };

    Ok(Json(json!({
        "success": outcome.paid,
        "message": message,
        "order": outcome.order,
    })))
}

/// The user's orders, newest first.
///
/// GET /api/order/mine
#[instrument(skip(state, auth))]
async fn mine(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Every order in the system, newest first.
///
/// GET /api/order/list (admin)
#[instrument(skip(state, admin))]
async fn list_all(State(state): State<AppState>, admin: RequireAdmin) -> Result<impl IntoResponse> {
    let RequireAdmin(_) = admin;
    let orders = OrderRepository::new(state.pool()).list_all().await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Set an order's fulfillment status. Any status from the enum is accepted;
/// no transition graph is enforced.
///
/// POST /api/order/status (admin)
#[instrument(skip(state, admin, body))]
async fn set_status(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(body): Json<StatusRequest>,
) -> Result<impl IntoResponse> {
    let RequireAdmin(_) = admin;
    OrderRepository::new(state.pool())
        .set_status(body.order_id, body.status)
        .await?;

    Ok(Json(json!({ "success": true })))
}

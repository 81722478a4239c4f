//! Cart routes.
//!
//! A cart line is identified by (product, size, color). Adding an existing
//! line increments its quantity; an update to quantity zero or below removes
//! the line. No stock is checked or reserved here.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use atelier_core::ProductId;
use atelier_core::cart::{Cart, CartLine, LineKey};

use crate::db::{CartRepository, ProductRepository};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add", post(add))
        .route("/api/cart/update", post(update))
        .route("/api/cart/remove", post(remove))
        .route("/api/cart/clear", post(clear))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest {
    product_id: ProductId,
    size: String,
    color: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    product_id: ProductId,
    size: String,
    color: String,
    /// Zero or below removes the line.
    quantity: i64,
}

/// Map a raw wire quantity onto the cart's unsigned quantity. Anything at
/// or below zero becomes 0, which `Cart::update_quantity` treats as removal.
fn effective_quantity(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveRequest {
    product_id: ProductId,
    size: String,
    color: String,
}

fn envelope(cart: &Cart) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "cart": cart }))
}

/// The user's cart.
///
/// GET /api/cart
#[instrument(skip(state, auth))]
async fn get_cart(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let cart = CartRepository::new(state.pool()).load(user.id).await?;

    Ok(envelope(&cart))
}

/// Add a line (or bump an existing line's quantity).
///
/// The line snapshots the product's current name, variant price, and first
/// image so the cart renders without a join.
///
/// POST /api/cart/add
#[instrument(skip(state, auth, body))]
async fn add(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<AddRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;

    let product = ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {}", body.product_id)))?;

    let variant = product
        .color_variants
        .iter()
        .find(|v| v.color == body.color)
        .ok_or_else(|| ApiError::NotFound(format!("color {} not offered", body.color)))?;

    let line = CartLine {
        product_id: product.id,
        name: product.name.clone(),
        price: variant.price,
        quantity: body.quantity.max(1),
        size: body.size,
        color: body.color,
        image_url: variant.images.first().cloned(),
    };

    let cart = CartRepository::new(state.pool())
        .mutate(user.id, move |cart| cart.add(line.clone()))
        .await?;

    Ok(envelope(&cart))
}

/// Set a line's quantity; zero or a negative value removes it.
///
/// POST /api/cart/update
#[instrument(skip(state, auth, body))]
async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<UpdateRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;

    let cart = CartRepository::new(state.pool())
        .mutate(user.id, |cart| {
            let key = LineKey {
                product_id: body.product_id,
                size: &body.size,
                color: &body.color,
            };
            cart.update_quantity(&key, effective_quantity(body.quantity));
        })
        .await?;

    Ok(envelope(&cart))
}

/// Remove a line.
///
/// POST /api/cart/remove
#[instrument(skip(state, auth, body))]
async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<RemoveRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;

    let cart = CartRepository::new(state.pool())
        .mutate(user.id, |cart| {
            let key = LineKey {
                product_id: body.product_id,
                size: &body.size,
                color: &body.color,
            };
            cart.remove(&key);
        })
        .await?;

    Ok(envelope(&cart))
}

/// Empty the cart.
///
/// POST /api/cart/clear
#[instrument(skip(state, auth))]
async fn clear(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let carts = CartRepository::new(state.pool());
    carts.clear(user.id).await?;

    Ok(envelope(&Cart::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_update_quantity_deserializes_and_removes() {
        let body: UpdateRequest = serde_json::from_value(json!({
            "productId": 7,
            "size": "M",
            "color": "Black",
            "quantity": -3,
        }))
        .unwrap();

        assert_eq!(effective_quantity(body.quantity), 0);
    }

    #[test]
    fn positive_update_quantity_passes_through() {
        assert_eq!(effective_quantity(0), 0);
        assert_eq!(effective_quantity(4), 4);
    }
}

//! Account sub-resources: address book and wishlist.
//!
//! Every route requires a logged-in user and operates only on that user's
//! rows; ids belonging to other users read as not found.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use atelier_core::{AddressId, ProductId};

use crate::db::UserRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::models::user::NewAddress;
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/user/addresses", get(list_addresses))
        .route("/api/user/addresses/add", post(add_address))
        .route("/api/user/addresses/update", post(update_address))
        .route("/api/user/addresses/delete", post(delete_address))
        .route("/api/user/addresses/default", post(set_default_address))
        .route("/api/user/wishlist", get(wishlist))
        .route("/api/user/wishlist/add", post(add_wishlist))
        .route("/api/user/wishlist/remove", post(remove_wishlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAddressRequest {
    id: AddressId,
    #[serde(flatten)]
    address: NewAddress,
}

#[derive(Debug, Deserialize)]
struct AddressIdRequest {
    id: AddressId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistRequest {
    product_id: ProductId,
}

/// The user's addresses, default first.
///
/// GET /api/user/addresses
#[instrument(skip(state, auth))]
async fn list_addresses(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let addresses = UserRepository::new(state.pool())
        .list_addresses(user.id)
        .await?;

    Ok(Json(json!({ "success": true, "addresses": addresses })))
}

/// Add an address.
///
/// POST /api/user/addresses/add
#[instrument(skip(state, auth, body))]
async fn add_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<NewAddress>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let address = UserRepository::new(state.pool())
        .add_address(user.id, &body)
        .await?;

    Ok(Json(json!({ "success": true, "address": address })))
}

/// Replace an address's fields.
///
/// POST /api/user/addresses/update
#[instrument(skip(state, auth, body))]
async fn update_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<UpdateAddressRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let address = UserRepository::new(state.pool())
        .update_address(user.id, body.id, &body.address)
        .await?;

    Ok(Json(json!({ "success": true, "address": address })))
}

/// Delete an address.
///
/// POST /api/user/addresses/delete
#[instrument(skip(state, auth, body))]
async fn delete_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<AddressIdRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let deleted = UserRepository::new(state.pool())
        .delete_address(user.id, body.id)
        .await?;

    if !deleted {
        return Err(ApiError::NotFound(format!("address {}", body.id)));
    }

    Ok(Json(json!({ "success": true })))
}

/// Make one address the default.
///
/// POST /api/user/addresses/default
#[instrument(skip(state, auth, body))]
async fn set_default_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<AddressIdRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    UserRepository::new(state.pool())
        .set_default_address(user.id, body.id)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// The product ids on the user's wishlist, newest first.
///
/// GET /api/user/wishlist
#[instrument(skip(state, auth))]
async fn wishlist(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    let product_ids = UserRepository::new(state.pool()).wishlist(user.id).await?;

    Ok(Json(json!({ "success": true, "wishlist": product_ids })))
}

/// Add a product to the wishlist (idempotent).
///
/// POST /api/user/wishlist/add
#[instrument(skip(state, auth, body))]
async fn add_wishlist(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<WishlistRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    UserRepository::new(state.pool())
        .add_wishlist(user.id, body.product_id)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// Remove a product from the wishlist.
///
/// POST /api/user/wishlist/remove
#[instrument(skip(state, auth, body))]
async fn remove_wishlist(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<WishlistRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(user) = auth;
    UserRepository::new(state.pool())
        .remove_wishlist(user.id, body.product_id)
        .await?;

    Ok(Json(json!({ "success": true })))
}

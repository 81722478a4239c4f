//! Catalog routes: public reads plus admin product management.
//!
//! Admin add/edit take multipart bodies: plain fields for the product and
//! a `variants` JSON field, with media parts named `image_{color}_{n}` and
//! `video_{color}`.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use atelier_core::catalog::MediaField;
use atelier_core::{ProductId, VariantId};

use crate::db::ProductRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::ProductFilter;
use crate::services::CatalogService;
use crate::services::catalog::{MediaUpload, ProductSubmission, VariantSubmission};
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/product/list", get(list))
        .route("/api/product/availability", post(availability))
        .route("/api/product/add", post(add))
        .route("/api/product/edit", post(edit))
        .route("/api/product/remove", post(remove))
        .route("/api/product/stock", post(stock))
        .route("/api/product/{id}", get(get_one))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityRequest {
    product_id: ProductId,
    color: String,
    size: String,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct RemoveRequest {
    id: ProductId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockRequest {
    product_id: ProductId,
    variant_id: VariantId,
    stock: u32,
}

/// List products, optionally filtered.
///
/// GET /api/product/list?category=&subCategory=&bestseller=
#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(json!({ "success": true, "products": products })))
}

/// One product by id.
///
/// GET /api/product/{id}
#[instrument(skip(state))]
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// Availability of one size of one color variant. A pure read; nothing is
/// reserved.
///
/// POST /api/product/availability
#[instrument(skip(state, body))]
async fn availability(
    State(state): State<AppState>,
    Json(body): Json<AvailabilityRequest>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {}", body.product_id)))?;

    let variant = product
        .color_variants
        .iter()
        .find(|v| v.color == body.color)
        .ok_or_else(|| ApiError::NotFound(format!("color {} not offered", body.color)))?;

    let availability = variant.availability(&body.size, body.quantity);

    Ok(Json(json!({
        "success": true,
        "sizeAvailable": availability.size_available,
        "stockSufficient": availability.stock_sufficient,
        "available": availability.available,
    })))
}

/// Create a product.
///
/// POST /api/product/add (admin, multipart)
#[instrument(skip(state, admin, multipart))]
async fn add(
    State(state): State<AppState>,
    admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let RequireAdmin(_) = admin;
    let (_, submission, media) = parse_product_form(multipart).await?;

    let service = CatalogService::new(state.pool(), state.cloudinary());
    let product = service.create_product(submission, media).await?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// Edit a product. The multipart body carries an `id` field alongside the
/// same fields as add.
///
/// POST /api/product/edit (admin, multipart)
#[instrument(skip(state, admin, multipart))]
async fn edit(
    State(state): State<AppState>,
    admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let RequireAdmin(_) = admin;
    let (id, submission, media) = parse_product_form(multipart).await?;
    let id = id.ok_or_else(|| ApiError::BadRequest("missing product id".to_owned()))?;

    let service = CatalogService::new(state.pool(), state.cloudinary());
    let product = service.edit_product(id, submission, media).await?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// Remove a product.
///
/// POST /api/product/remove (admin)
#[instrument(skip(state, admin, body))]
async fn remove(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(body): Json<RemoveRequest>,
) -> Result<impl IntoResponse> {
    let RequireAdmin(_) = admin;
    let service = CatalogService::new(state.pool(), state.cloudinary());
    service.remove_product(body.id).await?;

    Ok(Json(json!({ "success": true })))
}

/// Set one variant's stock.
///
/// POST /api/product/stock (admin)
#[instrument(skip(state, admin, body))]
async fn stock(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(body): Json<StockRequest>,
) -> Result<impl IntoResponse> {
    let RequireAdmin(_) = admin;
    let service = CatalogService::new(state.pool(), state.cloudinary());
    let product = service
        .set_stock(body.product_id, body.variant_id, body.stock)
        .await?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// Pull the product fields and media files out of a multipart body.
///
/// Unknown field names are ignored so admin UI additions don't break older
/// servers; media parts must parse as `image_{color}_{n}` / `video_{color}`.
async fn parse_product_form(
    mut multipart: Multipart,
) -> Result<(Option<ProductId>, ProductSubmission, Vec<MediaUpload>)> {
    let bad = |msg: String| ApiError::BadRequest(msg);

    let mut id: Option<ProductId> = None;
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category: Option<String> = None;
    let mut sub_category: Option<String> = None;
    let mut bestseller = false;
    let mut variants: Option<Vec<VariantSubmission>> = None;
    let mut media: Vec<MediaUpload> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad(format!("malformed multipart body: {e}")))?
    {
        let Some(field_name) = field.name().map(str::to_owned) else {
            continue;
        };

        if let Some(media_field) = MediaField::parse(&field_name) {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad(format!("failed reading {field_name}: {e}")))?;
            media.push(MediaUpload {
                field: media_field,
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| bad(format!("failed reading {field_name}: {e}")))?;

        match field_name.as_str() {
            "id" => {
                let parsed = value
                    .parse::<i32>()
                    .map_err(|_| bad(format!("invalid product id: {value}")))?;
                id = Some(ProductId::new(parsed));
            }
            "name" => name = Some(value),
            "description" => description = Some(value),
            "category" => category = Some(value),
            "subCategory" => sub_category = Some(value),
            "bestseller" => bestseller = value == "true",
            "variants" => {
                variants = Some(
                    serde_json::from_str(&value)
                        .map_err(|e| bad(format!("invalid variants JSON: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let submission = ProductSubmission {
        name: name.ok_or_else(|| bad("missing field: name".to_owned()))?,
        description: description.ok_or_else(|| bad("missing field: description".to_owned()))?,
        category: category.ok_or_else(|| bad("missing field: category".to_owned()))?,
        sub_category: sub_category.ok_or_else(|| bad("missing field: subCategory".to_owned()))?,
        bestseller,
        variants: variants.ok_or_else(|| bad("missing field: variants".to_owned()))?,
    };

    Ok((id, submission, media))
}

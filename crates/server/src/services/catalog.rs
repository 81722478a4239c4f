//! Catalog service: admin product CRUD with media uploads.
//!
//! Media parts arrive named `image_{color}_{n}` / `video_{color}`; each is
//! pushed to Cloudinary and the variant stores only the returned secure URL.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, instrument};

use atelier_core::catalog::{ColorVariant, MediaField, validate_variants};
use atelier_core::{Money, ProductId, VariantId};

use crate::cloudinary::{CloudinaryClient, MediaKind};
use crate::db::ProductRepository;
use crate::error::{ApiError, Result};
use crate::models::product::{NewProduct, Product};

/// One variant as submitted by the admin form.
///
/// `id` is present when editing an existing variant (its media is kept
/// unless replaced) and absent for new variants.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSubmission {
    #[serde(default)]
    pub id: Option<VariantId>,
    pub color: String,
    pub price: Money,
    pub stock: u32,
    pub sizes: Vec<String>,
}

/// Product fields as submitted by the admin form (media arrives separately).
#[derive(Debug, Clone)]
pub struct ProductSubmission {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub bestseller: bool,
    pub variants: Vec<VariantSubmission>,
}

/// One media file pulled out of the multipart body.
#[derive(Debug)]
pub struct MediaUpload {
    pub field: MediaField,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Media URLs collected per color after uploading.
#[derive(Debug, Default)]
struct ColorMedia {
    /// (index, url) pairs, sorted before use.
    images: Vec<(usize, String)>,
    video: Option<String>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    cloudinary: &'a CloudinaryClient,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cloudinary: &'a CloudinaryClient) -> Self {
        Self {
            products: ProductRepository::new(pool),
            cloudinary,
        }
    }

    /// Create a product: upload all media, assemble variants, persist.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::VariantValidation` if the variant list breaks a
    /// catalog invariant and `ApiError::Cloudinary` if an upload fails.
    #[instrument(skip(self, submission, media), fields(name = %submission.name))]
    pub async fn create_product(
        &self,
        submission: ProductSubmission,
        media: Vec<MediaUpload>,
    ) -> Result<Product> {
        let mut uploaded = self.upload_media(media).await?;

        let color_variants: Vec<ColorVariant> = submission
            .variants
            .into_iter()
            .map(|v| {
                let media = uploaded.remove(&v.color).unwrap_or_default();
                build_variant(v, media, None)
            })
            .collect();

        validate_variants(&color_variants)?;

        let product = self
            .products
            .create(&NewProduct {
                name: submission.name,
                description: submission.description,
                category: submission.category,
                sub_category: submission.sub_category,
                bestseller: submission.bestseller,
                color_variants,
            })
            .await?;

        info!(product_id = %product.id, "Product created");

        Ok(product)
    }

    /// Edit a product: replace its fields and variant list.
    ///
    /// Variants submitted with an `id` keep their stored media unless new
    /// uploads for that color replace it; variants without an `id` are new.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product doesn't exist.
    #[instrument(skip(self, submission, media), fields(product_id = %id))]
    pub async fn edit_product(
        &self,
        id: ProductId,
        submission: ProductSubmission,
        media: Vec<MediaUpload>,
    ) -> Result<Product> {
        let existing = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

        let mut uploaded = self.upload_media(media).await?;

        let color_variants: Vec<ColorVariant> = submission
            .variants
            .into_iter()
            .map(|v| {
                let kept = v
                    .id
                    .and_then(|vid| existing.color_variants.iter().find(|e| e.id == vid));
                let media = uploaded.remove(&v.color).unwrap_or_default();
                build_variant(v, media, kept)
            })
            .collect();

        validate_variants(&color_variants)?;

        let product = self
            .products
            .update(
                id,
                &NewProduct {
                    name: submission.name,
                    description: submission.description,
                    category: submission.category,
                    sub_category: submission.sub_category,
                    bestseller: submission.bestseller,
                    color_variants,
                },
            )
            .await?;

        info!(product_id = %product.id, "Product updated");

        Ok(product)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product doesn't exist.
    #[instrument(skip(self))]
    pub async fn remove_product(&self, id: ProductId) -> Result<()> {
        if !self.products.delete(id).await? {
            return Err(ApiError::NotFound(format!("product {id}")));
        }

        info!(product_id = %id, "Product removed");

        Ok(())
    }

    /// Set one variant's stock, touching nothing else on the product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product or variant doesn't exist.
    #[instrument(skip(self))]
    pub async fn set_stock(
        &self,
        id: ProductId,
        variant_id: VariantId,
        stock: u32,
    ) -> Result<Product> {
        let product = self
            .products
            .update_variant_stock(id, variant_id, stock)
            .await?;

        info!(product_id = %id, %variant_id, stock, "Stock updated");

        Ok(product)
    }

    /// Upload every media part, grouping the resulting URLs by color.
    async fn upload_media(
        &self,
        media: Vec<MediaUpload>,
    ) -> Result<HashMap<String, ColorMedia>> {
        let mut by_color: HashMap<String, ColorMedia> = HashMap::new();

        for upload in media {
            match upload.field {
                MediaField::Image { color, index } => {
                    let result = self
                        .cloudinary
                        .upload(MediaKind::Image, upload.file_name, upload.bytes)
                        .await?;
                    by_color
                        .entry(color)
                        .or_default()
                        .images
                        .push((index, result.secure_url));
                }
                MediaField::Video { color } => {
                    let result = self
                        .cloudinary
                        .upload(MediaKind::Video, upload.file_name, upload.bytes)
                        .await?;
                    by_color.entry(color).or_default().video = Some(result.secure_url);
                }
            }
        }

        Ok(by_color)
    }
}

/// Assemble one variant from its submission, fresh uploads, and (when
/// editing) the stored variant whose media survives if nothing replaced it.
fn build_variant(
    submission: VariantSubmission,
    mut media: ColorMedia,
    kept: Option<&ColorVariant>,
) -> ColorVariant {
    media.images.sort_by_key(|(index, _)| *index);
    let mut images: Vec<String> = media.images.into_iter().map(|(_, url)| url).collect();
    let mut video = media.video;

    if let Some(kept) = kept {
        if images.is_empty() {
            images = kept.images.clone();
        }
        if video.is_none() {
            video = kept.video.clone();
        }
    }

    ColorVariant {
        id: submission.id.unwrap_or_else(VariantId::generate),
        color: submission.color,
        images,
        video,
        price: submission.price,
        stock: submission.stock,
        sizes: submission.sizes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn submission(color: &str) -> VariantSubmission {
        VariantSubmission {
            id: None,
            color: color.to_owned(),
            price: Money::new(Decimal::from(999)),
            stock: 5,
            sizes: vec!["M".to_owned()],
        }
    }

    #[test]
    fn images_ordered_by_field_index() {
        let media = ColorMedia {
            images: vec![
                (3, "c.jpg".to_owned()),
                (1, "a.jpg".to_owned()),
                (2, "b.jpg".to_owned()),
            ],
            video: None,
        };

        let variant = build_variant(submission("Black"), media, None);
        assert_eq!(variant.images, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn parsed_field_indices_order_uploads() {
        let mut media = ColorMedia::default();
        for name in ["image_Black_2", "image_Black_0", "image_Black_1"] {
            let Some(MediaField::Image { index, .. }) = MediaField::parse(name) else {
                panic!("{name} should parse as an image field");
            };
            media.images.push((index, format!("{name}.jpg")));
        }

        let variant = build_variant(submission("Black"), media, None);
        assert_eq!(
            variant.images,
            vec!["image_Black_0.jpg", "image_Black_1.jpg", "image_Black_2.jpg"]
        );
    }

    #[test]
    fn kept_variant_media_survives_when_nothing_uploaded() {
        let existing = ColorVariant {
            id: VariantId::generate(),
            color: "Black".to_owned(),
            images: vec!["old.jpg".to_owned()],
            video: Some("old.mp4".to_owned()),
            price: Money::new(Decimal::from(999)),
            stock: 2,
            sizes: vec!["M".to_owned()],
        };

        let mut sub = submission("Black");
        sub.id = Some(existing.id);
        let variant = build_variant(sub, ColorMedia::default(), Some(&existing));

        assert_eq!(variant.id, existing.id);
        assert_eq!(variant.images, vec!["old.jpg"]);
        assert_eq!(variant.video.as_deref(), Some("old.mp4"));
    }

    #[test]
    fn fresh_uploads_replace_kept_media() {
        let existing = ColorVariant {
            id: VariantId::generate(),
            color: "Black".to_owned(),
            images: vec!["old.jpg".to_owned()],
            video: None,
            price: Money::new(Decimal::from(999)),
            stock: 2,
            sizes: vec!["M".to_owned()],
        };

        let media = ColorMedia {
            images: vec![(1, "new.jpg".to_owned())],
            video: None,
        };
        let mut sub = submission("Black");
        sub.id = Some(existing.id);
        let variant = build_variant(sub, media, Some(&existing));

        assert_eq!(variant.images, vec!["new.jpg"]);
    }
}

//! Catalog domain: color variants, availability checks, and media naming.
//!
//! A [`ColorVariant`] is the unit of sellable inventory: a per-color slice of
//! a product carrying its own price, stock, sizes, and media. Variants are
//! embedded in the product document and addressed by stable [`VariantId`]s,
//! never by array position.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Money, VariantId};

/// Color name reserved for single-variant products without a color choice.
pub const COLORLESS: &str = "None";

/// A per-color slice of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorVariant {
    /// Stable identifier, generated at creation.
    pub id: VariantId,
    /// Color name shown to shoppers ("Black", "Navy Blue", or [`COLORLESS`]).
    pub color: String,
    /// Secure media URLs, in display order.
    pub images: Vec<String>,
    /// Optional secure video URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    /// Unit price for this color.
    pub price: Money,
    /// Units on hand. Informational for display plus debited on paid orders.
    pub stock: u32,
    /// Sizes offered for this color ("S", "M", "L", ...).
    pub sizes: Vec<String>,
}

impl ColorVariant {
    /// Debit `quantity` units of stock, clamping at zero.
    ///
    /// Returns the quantity actually debited. Clamping instead of failing
    /// mirrors the fact that availability checks never reserve stock, so a
    /// paid order can legitimately exceed what is still recorded on hand.
    pub fn debit_stock(&mut self, quantity: u32) -> u32 {
        let debited = self.stock.min(quantity);
        self.stock -= debited;
        debited
    }
}

/// Availability of one size of one color variant.
///
/// A pure read: nothing is reserved, so a race between this check and order
/// placement can still oversell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// The requested size is offered for this color.
    pub size_available: bool,
    /// Recorded stock covers the requested quantity.
    pub stock_sufficient: bool,
    /// Both of the above.
    pub available: bool,
}

impl ColorVariant {
    /// Check whether `quantity` units of `size` could be fulfilled.
    #[must_use]
    pub fn availability(&self, size: &str, quantity: u32) -> Availability {
        let size_available = self.sizes.iter().any(|s| s == size);
        let stock_sufficient = self.stock >= quantity;
        Availability {
            size_available,
            stock_sufficient,
            available: size_available && stock_sufficient,
        }
    }
}

/// Errors produced when validating a product's variant list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// A product must carry at least one variant.
    #[error("product must have at least one color variant")]
    Empty,
    /// The reserved "None" color must be the only variant.
    #[error("a \"{COLORLESS}\" variant must be the only variant")]
    ColorlessNotAlone,
    /// Two variants share a color name.
    #[error("duplicate color variant: {0}")]
    DuplicateColor(String),
    /// A variant has no sizes.
    #[error("variant {0} has no sizes")]
    NoSizes(String),
    /// A variant's price is negative.
    #[error("variant {0} has a negative price")]
    NegativePrice(String),
}

/// Validate a product's variant list.
///
/// Enforces the intended catalog invariants: at least one variant, unique
/// colors, sizes present, non-negative prices, and - if the reserved
/// [`COLORLESS`] color appears - that it is the only variant.
///
/// # Errors
///
/// Returns the first [`VariantError`] encountered.
pub fn validate_variants(variants: &[ColorVariant]) -> Result<(), VariantError> {
    if variants.is_empty() {
        return Err(VariantError::Empty);
    }

    if variants.len() > 1 && variants.iter().any(|v| v.color == COLORLESS) {
        return Err(VariantError::ColorlessNotAlone);
    }

    let mut seen: Vec<&str> = Vec::with_capacity(variants.len());
    for variant in variants {
        if seen.contains(&variant.color.as_str()) {
            return Err(VariantError::DuplicateColor(variant.color.clone()));
        }
        seen.push(&variant.color);

        if variant.sizes.is_empty() {
            return Err(VariantError::NoSizes(variant.color.clone()));
        }
        if variant.price.is_negative() {
            return Err(VariantError::NegativePrice(variant.color.clone()));
        }
    }

    Ok(())
}

/// A parsed multipart media field name.
///
/// Product media arrives as multipart fields named by a per-color convention:
/// `image_{color}_{n}` for the n-th image of a color and `video_{color}` for
/// its video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaField {
    /// `image_{color}_{n}`
    Image {
        /// Color the image belongs to.
        color: String,
        /// Zero-based position within the color's image list.
        index: usize,
    },
    /// `video_{color}`
    Video {
        /// Color the video belongs to.
        color: String,
    },
}

impl MediaField {
    /// Parse a multipart field name into a media field.
    ///
    /// Returns `None` for field names outside the convention (those are
    /// regular form fields, not media).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(rest) = name.strip_prefix("image_") {
            // The index is the suffix after the last underscore; the color
            // itself may contain spaces but not underscores.
            let (color, index) = rest.rsplit_once('_')?;
            let index = index.parse::<usize>().ok()?;
            if color.is_empty() {
                return None;
            }
            return Some(Self::Image {
                color: color.to_owned(),
                index,
            });
        }

        if let Some(color) = name.strip_prefix("video_") {
            if color.is_empty() {
                return None;
            }
            return Some(Self::Video {
                color: color.to_owned(),
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn variant(color: &str, stock: u32, sizes: &[&str]) -> ColorVariant {
        ColorVariant {
            id: VariantId::generate(),
            color: color.to_owned(),
            images: vec![],
            video: None,
            price: Money::new(Decimal::from(999)),
            stock,
            sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn test_availability_requires_size_and_stock() {
        let v = variant("Black", 3, &["S", "M"]);

        let ok = v.availability("M", 2);
        assert!(ok.size_available && ok.stock_sufficient && ok.available);

        // stock:3, requested:5 -> stock_sufficient:false, available:false
        let short = v.availability("M", 5);
        assert!(short.size_available);
        assert!(!short.stock_sufficient);
        assert!(!short.available);

        let wrong_size = v.availability("XL", 1);
        assert!(!wrong_size.size_available);
        assert!(!wrong_size.available);
    }

    #[test]
    fn test_debit_stock_clamps_at_zero() {
        let mut v = variant("Black", 3, &["M"]);
        assert_eq!(v.debit_stock(2), 2);
        assert_eq!(v.stock, 1);
        assert_eq!(v.debit_stock(5), 1);
        assert_eq!(v.stock, 0);
    }

    #[test]
    fn test_validate_rejects_colorless_with_siblings() {
        let variants = vec![variant("None", 1, &["M"]), variant("Black", 1, &["M"])];
        assert_eq!(
            validate_variants(&variants),
            Err(VariantError::ColorlessNotAlone)
        );

        let alone = vec![variant("None", 1, &["M"])];
        assert!(validate_variants(&alone).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty() {
        assert_eq!(validate_variants(&[]), Err(VariantError::Empty));

        let dup = vec![variant("Black", 1, &["M"]), variant("Black", 2, &["L"])];
        assert_eq!(
            validate_variants(&dup),
            Err(VariantError::DuplicateColor("Black".to_owned()))
        );
    }

    #[test]
    fn test_validate_rejects_sizeless_variant() {
        let sizeless = vec![variant("Black", 1, &[])];
        assert_eq!(
            validate_variants(&sizeless),
            Err(VariantError::NoSizes("Black".to_owned()))
        );
    }

    #[test]
    fn test_media_field_parsing() {
        assert_eq!(
            MediaField::parse("image_Black_0"),
            Some(MediaField::Image {
                color: "Black".to_owned(),
                index: 0
            })
        );
        assert_eq!(
            MediaField::parse("image_Navy Blue_2"),
            Some(MediaField::Image {
                color: "Navy Blue".to_owned(),
                index: 2
            })
        );
        assert_eq!(
            MediaField::parse("video_Black"),
            Some(MediaField::Video {
                color: "Black".to_owned()
            })
        );
        assert_eq!(MediaField::parse("name"), None);
        assert_eq!(MediaField::parse("image_Black"), None);
        assert_eq!(MediaField::parse("image__0"), None);
        assert_eq!(MediaField::parse("video_"), None);
    }
}

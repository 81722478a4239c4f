//! Seed the catalog with sample products.
//!
//! Intended for development databases; running it twice inserts the sample
//! products twice.

use rust_decimal::Decimal;
use tracing::info;

use atelier_core::catalog::{COLORLESS, ColorVariant};
use atelier_core::{Money, VariantId};
use atelier_server::db::ProductRepository;
use atelier_server::models::product::NewProduct;

use super::{CliError, database_url};

fn variant(color: &str, price: i64, stock: u32, sizes: &[&str]) -> ColorVariant {
    ColorVariant {
        id: VariantId::generate(),
        color: color.to_owned(),
        images: Vec::new(),
        video: None,
        price: Money::new(Decimal::from(price)),
        stock,
        sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
    }
}

fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Relaxed Linen Shirt".to_owned(),
            description: "Breathable linen shirt with a relaxed drape.".to_owned(),
            category: "Men".to_owned(),
            sub_category: "Topwear".to_owned(),
            bestseller: true,
            color_variants: vec![
                variant("White", 1499, 25, &["S", "M", "L", "XL"]),
                variant("Navy Blue", 1499, 18, &["M", "L", "XL"]),
            ],
        },
        NewProduct {
            name: "High-Rise Wide Leg Trousers".to_owned(),
            description: "Tailored wide-leg trousers with a high rise.".to_owned(),
            category: "Women".to_owned(),
            sub_category: "Bottomwear".to_owned(),
            bestseller: true,
            color_variants: vec![
                variant("Black", 1999, 30, &["XS", "S", "M", "L"]),
                variant("Beige", 1999, 12, &["S", "M", "L"]),
            ],
        },
        NewProduct {
            name: "Printed Cotton Kidswear Set".to_owned(),
            description: "Two-piece printed cotton set for kids.".to_owned(),
            category: "Kids".to_owned(),
            sub_category: "Topwear".to_owned(),
            bestseller: false,
            color_variants: vec![variant(COLORLESS, 899, 40, &["2-3Y", "4-5Y", "6-7Y"])],
        },
    ]
}

/// Insert the sample catalog.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = database_url()?;
    let pool = atelier_server::db::create_pool(&database_url).await?;

    let products = ProductRepository::new(&pool);
    let samples = sample_products();
    let count = samples.len();

    for product in &samples {
        let created = products.create(product).await?;
        info!(product_id = %created.id, name = %created.name, "Seeded product");
    }

    info!(count, "Seeding complete");
    Ok(())
}

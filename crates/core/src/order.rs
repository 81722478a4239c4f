//! Canonical order shape, ingress validation, and server-side totals.
//!
//! The wire format historically carried two shapes at once: a legacy flat one
//! (`amount`, `address`, `payment` boolean) and a structured one (`total`,
//! `shippingAddress`, `paymentStatus`). Requests are normalized into the one
//! canonical representation here, at the boundary; legacy field names are
//! accepted as serde aliases and nothing downstream ever sees both shapes.
//!
//! The authoritative amounts are always recomputed from the line items -
//! a client-sent total is never trusted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Money, PaymentMethod, ProductId};

/// Flat shipping fee applied to every order.
pub const SHIPPING_FEE: Money = Money::ZERO;

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl OrderLine {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// A shipping or billing address captured on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub recipient: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Payment details attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    /// Gateway name ("razorpay"); absent for cash on delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// The gateway's remote order id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    /// The gateway's payment/transaction id, set on verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl PaymentDetails {
    /// Payment details for a fresh Razorpay order (gateway id set later).
    #[must_use]
    pub fn razorpay() -> Self {
        Self {
            method: PaymentMethod::Razorpay,
            gateway: Some("razorpay".to_owned()),
            gateway_order_id: None,
            transaction_id: None,
        }
    }

    /// Payment details for cash on delivery.
    #[must_use]
    pub const fn cod() -> Self {
        Self {
            method: PaymentMethod::Cod,
            gateway: None,
            gateway_order_id: None,
            transaction_id: None,
        }
    }
}

/// Server-computed order amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

/// Compute order totals from the line items.
///
/// `subtotal` is Σ price × quantity, `shipping` the flat [`SHIPPING_FEE`],
/// `total` their sum. This is the only source of the stored amounts.
#[must_use]
pub fn compute_totals(lines: &[OrderLine]) -> OrderTotals {
    let subtotal: Money = lines.iter().map(OrderLine::line_total).sum();
    OrderTotals {
        subtotal,
        shipping: SHIPPING_FEE,
        total: subtotal + SHIPPING_FEE,
    }
}

/// A line item as received on the wire, before validation.
///
/// Every field is optional so that a missing field produces a structured
/// validation error naming it, rather than a serde deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product_id: Option<ProductId>,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<u32>,
    pub size: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// An order placement request, normalized from either wire vintage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderLineInput>,
    /// Structured shape sends `shippingAddress`; the legacy flat shape sends
    /// `address`. Both land here.
    #[serde(alias = "address")]
    pub shipping_address: Option<OrderAddress>,
    #[serde(default)]
    pub billing_address: Option<OrderAddress>,
    /// The client's idea of the total (`amount` in the legacy shape). Kept
    /// only so legacy payloads deserialize; never used for the stored
    /// amounts.
    #[serde(default, alias = "amount")]
    pub total: Option<Money>,
}

/// Validation failures for an order placement request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    #[error("order must contain at least one item")]
    NoItems,
    #[error("shipping address is required")]
    MissingAddress,
    #[error("item {index}: missing {field}")]
    MissingItemField {
        index: usize,
        field: &'static str,
    },
    #[error("item {index}: quantity must be at least 1")]
    ZeroQuantity { index: usize },
    #[error("item {index}: price cannot be negative")]
    NegativePrice { index: usize },
}

impl PlaceOrderRequest {
    /// Validate the request into canonical order lines and an address.
    ///
    /// Rejects when items are absent, the address is absent, or any item is
    /// missing one of product id, name, price, quantity, size, or color.
    ///
    /// # Errors
    ///
    /// Returns the first [`OrderValidationError`] encountered.
    pub fn validate(self) -> Result<(Vec<OrderLine>, OrderAddress), OrderValidationError> {
        if self.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        let address = self
            .shipping_address
            .ok_or(OrderValidationError::MissingAddress)?;

        let mut lines = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.into_iter().enumerate() {
            let line = validate_item(index, item)?;
            lines.push(line);
        }

        Ok((lines, address))
    }
}

fn validate_item(index: usize, item: OrderLineInput) -> Result<OrderLine, OrderValidationError> {
    let missing = |field| OrderValidationError::MissingItemField { index, field };

    let product_id = item.product_id.ok_or_else(|| missing("productId"))?;
    let name = item
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| missing("name"))?;
    let price = item.price.ok_or_else(|| missing("price"))?;
    let quantity = item.quantity.ok_or_else(|| missing("quantity"))?;
    let size = item
        .size
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing("size"))?;
    let color = item
        .color
        .filter(|c| !c.is_empty())
        .ok_or_else(|| missing("color"))?;

    if quantity == 0 {
        return Err(OrderValidationError::ZeroQuantity { index });
    }
    if price.is_negative() {
        return Err(OrderValidationError::NegativePrice { index });
    }

    Ok(OrderLine {
        product_id,
        name,
        price,
        quantity,
        size,
        color,
        image_url: item.image_url,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn address() -> OrderAddress {
        OrderAddress {
            recipient: "A Shopper".to_owned(),
            line1: "1 High Street".to_owned(),
            line2: None,
            city: "Mumbai".to_owned(),
            state: "MH".to_owned(),
            postal_code: "400001".to_owned(),
            country: "IN".to_owned(),
            phone: None,
        }
    }

    fn item(product: i32, price: i64, quantity: u32) -> OrderLineInput {
        OrderLineInput {
            product_id: Some(ProductId::new(product)),
            name: Some(format!("product-{product}")),
            price: Some(Money::new(Decimal::from(price))),
            quantity: Some(quantity),
            size: Some("M".to_owned()),
            color: Some("Black".to_owned()),
            image_url: None,
        }
    }

    #[test]
    fn test_totals_never_taken_from_client() {
        let request = PlaceOrderRequest {
            items: vec![item(1, 1000, 2), item(2, 500, 1)],
            shipping_address: Some(address()),
            billing_address: None,
            // Client claims a bogus total; it must be ignored.
            total: Some(Money::new(Decimal::from(1))),
        };

        let (lines, _) = request.validate().expect("valid request");
        let totals = compute_totals(&lines);
        assert_eq!(totals.subtotal, Money::new(Decimal::from(2500)));
        assert_eq!(totals.shipping, Money::ZERO);
        assert_eq!(totals.total, Money::new(Decimal::from(2500)));
    }

    #[test]
    fn test_rejects_missing_item_fields() {
        for (field, breaker) in [
            ("productId", Box::new(|i: &mut OrderLineInput| i.product_id = None)
                as Box<dyn Fn(&mut OrderLineInput)>),
            ("name", Box::new(|i| i.name = None)),
            ("price", Box::new(|i| i.price = None)),
            ("quantity", Box::new(|i| i.quantity = None)),
            ("size", Box::new(|i| i.size = None)),
            ("color", Box::new(|i| i.color = None)),
        ] {
            let mut broken = item(1, 100, 1);
            breaker(&mut broken);
            let request = PlaceOrderRequest {
                items: vec![item(2, 100, 1), broken],
                shipping_address: Some(address()),
                billing_address: None,
                total: None,
            };
            assert_eq!(
                request.validate(),
                Err(OrderValidationError::MissingItemField { index: 1, field }),
                "expected rejection for missing {field}"
            );
        }
    }

    #[test]
    fn test_rejects_empty_items_and_missing_address() {
        let no_items = PlaceOrderRequest {
            items: vec![],
            shipping_address: Some(address()),
            billing_address: None,
            total: None,
        };
        assert_eq!(no_items.validate(), Err(OrderValidationError::NoItems));

        let no_address = PlaceOrderRequest {
            items: vec![item(1, 100, 1)],
            shipping_address: None,
            billing_address: None,
            total: None,
        };
        assert_eq!(
            no_address.validate(),
            Err(OrderValidationError::MissingAddress)
        );
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let request = PlaceOrderRequest {
            items: vec![item(1, 100, 0)],
            shipping_address: Some(address()),
            billing_address: None,
            total: None,
        };
        assert_eq!(
            request.validate(),
            Err(OrderValidationError::ZeroQuantity { index: 0 })
        );
    }

    #[test]
    fn test_legacy_aliases_deserialize() {
        // Legacy flat shape: `address` and `amount` instead of
        // `shippingAddress` and `total`.
        let json = serde_json::json!({
            "items": [{
                "productId": 1,
                "name": "Silk Scarf",
                "price": "1499",
                "quantity": 1,
                "size": "M",
                "color": "Black"
            }],
            "address": {
                "recipient": "A Shopper",
                "line1": "1 High Street",
                "city": "Mumbai",
                "state": "MH",
                "postalCode": "400001",
                "country": "IN"
            },
            "amount": "1499"
        });

        let request: PlaceOrderRequest =
            serde_json::from_value(json).expect("legacy shape deserializes");
        assert!(request.shipping_address.is_some());
        assert_eq!(request.total, Some(Money::new(Decimal::from(1499))));

        let (lines, _) = request.validate().expect("valid request");
        assert_eq!(lines.len(), 1);
        assert_eq!(
            compute_totals(&lines).total,
            Money::new(Decimal::from(1499))
        );
    }
}

//! Order repository: placed orders with lines, addresses, and payment
//! details embedded as JSONB.
//!
//! Payment confirmation is the one multi-table write in the system: the
//! order is marked paid, variant stock is debited, and the buyer's cart is
//! cleared, all in a single transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use atelier_core::catalog::ColorVariant;
use atelier_core::order::{OrderAddress, OrderLine, PaymentDetails};
use atelier_core::{Money, OrderId, OrderStatus, PaymentStatus, UserId};

use super::{RepositoryError, decode_json, encode_json};
use crate::models::order::{NewOrder, Order};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    items: serde_json::Value,
    subtotal: rust_decimal::Decimal,
    shipping: rust_decimal::Decimal,
    total: rust_decimal::Decimal,
    shipping_address: serde_json::Value,
    billing_address: Option<serde_json::Value>,
    payment: serde_json::Value,
    payment_status: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, RepositoryError> {
        let items: Vec<OrderLine> = decode_json("items", self.items)?;
        let shipping_address: OrderAddress =
            decode_json("shipping_address", self.shipping_address)?;
        let billing_address: Option<OrderAddress> = self
            .billing_address
            .map(|v| decode_json("billing_address", v))
            .transpose()?;
        let payment: PaymentDetails = decode_json("payment", self.payment)?;

        let payment_status = self.payment_status.parse::<PaymentStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment_status in database: {e}"))
        })?;
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            items,
            subtotal: Money::new(self.subtotal),
            shipping: Money::new(self.shipping),
            total: Money::new(self.total),
            shipping_address,
            billing_address,
            payment,
            payment_status,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, items, subtotal, shipping, total, shipping_address, \
     billing_address, payment, payment_status, status, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a freshly placed order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: UserId, input: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let row = insert_order(&mut tx, user_id, input).await?;
        tx.commit().await?;

        row.into_domain()
    }

    /// Persist a cash-on-delivery order.
    ///
    /// COD never passes through payment verification, so the stock debit and
    /// cart clear that otherwise happen in [`Self::confirm_payment`] happen
    /// at placement, in one transaction with the insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; the
    /// transaction rolls back as a whole.
    pub async fn create_cod(
        &self,
        user_id: UserId,
        input: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order = insert_order(&mut tx, user_id, input).await?.into_domain()?;

        for line in &order.items {
            debit_line_stock(&mut tx, line).await?;
        }

        sqlx::query("DELETE FROM atelier.cart WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Record the gateway's order id once the remote order exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_gateway_order_id(
        &self,
        id: OrderId,
        gateway_order_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE atelier."order"
            SET payment = jsonb_set(payment, '{gatewayOrderId}', to_jsonb($2::text)),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(gateway_order_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get an order scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM atelier."order" WHERE id = $1 AND user_id = $2"#
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM atelier."order"
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// List every order in the system, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM atelier."order" ORDER BY created_at DESC, id DESC"#
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// Set an order's fulfillment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result =
            sqlx::query(r#"UPDATE atelier."order" SET status = $2, updated_at = now() WHERE id = $1"#)
                .bind(id.as_i32())
                .bind(status.to_string())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Mark an order paid after gateway verification.
    ///
    /// One transaction: the order row is locked and flipped to paid with the
    /// gateway's transaction id recorded, stock is debited for each line, and
    /// the buyer's cart is cleared. Calling it again for an already-paid
    /// order is a no-op, so a double verification never debits stock twice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist or
    /// belongs to another user.
    pub async fn confirm_payment(
        &self,
        id: OrderId,
        user_id: UserId,
        transaction_id: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM atelier."order" WHERE id = $1 AND user_id = $2 FOR UPDATE"#
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let mut order = row.ok_or(RepositoryError::NotFound)?.into_domain()?;

        if order.payment_status == PaymentStatus::Paid {
            tx.rollback().await?;
            return Ok(order);
        }

        order.payment_status = PaymentStatus::Paid;
        order.payment.transaction_id = transaction_id.map(str::to_owned);
        let payment = encode_json("payment", &order.payment)?;

        sqlx::query(
            r#"
            UPDATE atelier."order"
            SET payment_status = $2, payment = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(order.payment_status.to_string())
        .bind(payment)
        .execute(&mut *tx)
        .await?;

        for line in &order.items {
            debit_line_stock(&mut tx, line).await?;
        }

        sqlx::query("DELETE FROM atelier.cart WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order)
    }
}

async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    input: &NewOrder,
) -> Result<OrderRow, RepositoryError> {
    let items = encode_json("items", &input.items)?;
    let shipping_address = encode_json("shipping_address", &input.shipping_address)?;
    let billing_address = input
        .billing_address
        .as_ref()
        .map(|a| encode_json("billing_address", a))
        .transpose()?;
    let payment = encode_json("payment", &input.payment)?;

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r#"
        INSERT INTO atelier."order"
            (user_id, items, subtotal, shipping, total, shipping_address,
             billing_address, payment, payment_status, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(user_id.as_i32())
    .bind(items)
    .bind(input.totals.subtotal.amount())
    .bind(input.totals.shipping.amount())
    .bind(input.totals.total.amount())
    .bind(shipping_address)
    .bind(billing_address)
    .bind(payment)
    .bind(input.payment_status.to_string())
    .bind(input.status.to_string())
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

/// Debit one order line's quantity from the matching variant's stock.
///
/// The product row is locked for the duration, so the plain write (no
/// revision check needed under the lock) can't race another payment. A
/// product or color that no longer exists is skipped; the sale already
/// happened and removing catalog entries must not block it.
async fn debit_line_stock(
    tx: &mut Transaction<'_, Postgres>,
    line: &OrderLine,
) -> Result<(), RepositoryError> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT color_variants FROM atelier.product WHERE id = $1 FOR UPDATE")
            .bind(line.product_id.as_i32())
            .fetch_optional(&mut **tx)
            .await?;

    let Some((value,)) = row else {
        return Ok(());
    };

    let mut variants: Vec<ColorVariant> = decode_json("color_variants", value)?;
    let Some(variant) = variants.iter_mut().find(|v| v.color == line.color) else {
        return Ok(());
    };
    variant.debit_stock(line.quantity);

    let variants = encode_json("color_variants", &variants)?;
    sqlx::query(
        r#"
        UPDATE atelier.product
        SET color_variants = $2, revision = revision + 1, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(line.product_id.as_i32())
    .bind(variants)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

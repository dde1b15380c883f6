//! # Inventory Repository
//!
//! Stock movements and the append-only movement ledger.
//!
//! ## Atomicity Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One Stock Change = One Transaction                      │
//! │                                                                         │
//! │  receive / adjust / dispose                                            │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. SELECT product (balance_before)                             │   │
//! │  │  2. UPDATE products SET on_hand = on_hand ± qty                 │   │
//! │  │     (decrements guarded with AND on_hand >= qty)                │   │
//! │  │  3. INSERT INTO inventory_movements (..., before, after)        │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both writes land or neither does. A crash can never leave     │
//! │           on_hand without its movement row.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order intake and refunds perform the same pair of writes inside the
//! order repository's transaction, via [`insert_movement`].

use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use yuandi_core::stock;
use yuandi_core::{InventoryMovement, Product};

/// Repository for inventory movement operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Receives purchased units into inventory (`inbound` movement).
    ///
    /// ## Arguments
    /// * `product_id` - Product UUID
    /// * `quantity` - Units received (> 0)
    /// * `ref_id` - Optional reference (e.g., a purchase memo id)
    pub async fn receive(
        &self,
        product_id: &str,
        quantity: i64,
        ref_id: Option<&str>,
    ) -> DbResult<InventoryMovement> {
        debug!(product_id = %product_id, quantity, "Receiving stock");

        let mut tx = self.pool.begin().await?;

        let mut product = fetch_product_tx(&mut tx, product_id).await?;
        let movement = stock::receive_stock(&mut product, quantity, Some("inbound"), ref_id)?;

        sqlx::query(
            r#"
            UPDATE products
            SET on_hand = on_hand + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        insert_movement(&mut *tx, &movement).await?;
        tx.commit().await?;

        info!(
            product_id = %product_id,
            quantity,
            on_hand = movement.balance_after,
            "Stock received"
        );
        Ok(movement)
    }

    /// Applies a signed manual correction (`adjustment` movement).
    ///
    /// Negative deltas are guarded: the correction fails rather than
    /// driving `on_hand` below zero.
    pub async fn adjust(
        &self,
        product_id: &str,
        delta: i64,
        ref_id: Option<&str>,
    ) -> DbResult<InventoryMovement> {
        debug!(product_id = %product_id, delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let mut product = fetch_product_tx(&mut tx, product_id).await?;
        let movement = stock::adjust_stock(&mut product, delta, Some("adjustment"), ref_id)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET on_hand = on_hand + ?2, updated_at = ?3
            WHERE id = ?1 AND on_hand + ?2 >= 0
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(shortage_error(&product.sku, movement.balance_before, -delta));
        }

        insert_movement(&mut *tx, &movement).await?;
        tx.commit().await?;

        info!(
            product_id = %product_id,
            delta,
            on_hand = movement.balance_after,
            "Stock adjusted"
        );
        Ok(movement)
    }

    /// Writes off damaged or lost units (`disposal` movement).
    pub async fn dispose(
        &self,
        product_id: &str,
        quantity: i64,
        ref_id: Option<&str>,
    ) -> DbResult<InventoryMovement> {
        debug!(product_id = %product_id, quantity, "Disposing stock");

        let mut tx = self.pool.begin().await?;

        let mut product = fetch_product_tx(&mut tx, product_id).await?;
        let movement = stock::dispose_stock(&mut product, quantity, Some("disposal"), ref_id)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET on_hand = on_hand - ?2, updated_at = ?3
            WHERE id = ?1 AND on_hand >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(shortage_error(&product.sku, movement.balance_before, quantity));
        }

        insert_movement(&mut *tx, &movement).await?;
        tx.commit().await?;

        info!(
            product_id = %product_id,
            quantity,
            on_hand = movement.balance_after,
            "Stock disposed"
        );
        Ok(movement)
    }

    /// Lists a product's movements, newest first.
    pub async fn history(&self, product_id: &str, limit: u32) -> DbResult<Vec<InventoryMovement>> {
        let movements: Vec<InventoryMovement> = sqlx::query_as(
            r#"
            SELECT
                id, product_id, movement_type, quantity,
                balance_before, balance_after,
                ref_type, ref_id, created_at
            FROM inventory_movements
            WHERE product_id = ?1
            ORDER BY rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Returns the latest movement's `balance_after` for a product, or
    /// `None` when the ledger is empty.
    ///
    /// Audit invariant: this must equal the product's current `on_hand`.
    pub async fn latest_balance(&self, product_id: &str) -> DbResult<Option<i64>> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT balance_after
            FROM inventory_movements
            WHERE product_id = ?1
            ORDER BY rowid DESC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }
}

// =============================================================================
// Shared Helpers (used by the order repository's transactions too)
// =============================================================================

/// Fetches a product row inside a transaction.
pub(crate) async fn fetch_product_tx(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    product_id: &str,
) -> DbResult<Product> {
    let product: Option<Product> = sqlx::query_as(
        r#"
        SELECT
            id, sku, category, model, color, brand,
            cost_cny_fen, sale_price_krw,
            on_hand, low_stock_threshold,
            is_active, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?;

    product.ok_or_else(|| DbError::not_found("Product", product_id))
}

/// Appends a movement row.
///
/// Generic over the executor so it runs both standalone and inside the
/// order repository's transactions.
pub(crate) async fn insert_movement<'e, E>(executor: E, movement: &InventoryMovement) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO inventory_movements (
            id, product_id, movement_type, quantity,
            balance_before, balance_after,
            ref_type, ref_id, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6,
            ?7, ?8, ?9
        )
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.balance_before)
    .bind(movement.balance_after)
    .bind(&movement.ref_type)
    .bind(&movement.ref_id)
    .bind(movement.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Builds the InsufficientStock error for a failed guarded update.
pub(crate) fn shortage_error(sku: &str, available: i64, requested: i64) -> DbError {
    yuandi_core::CoreError::InsufficientStock {
        sku: sku.to_string(),
        available,
        requested,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

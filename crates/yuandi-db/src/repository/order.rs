//! # Order Repository
//!
//! Transactional order intake, status transitions, and refunds.
//!
//! ## Order Intake
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Intake Flow                                  │
//! │                                                                         │
//! │  create(NewOrder)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate: customs code, customer name, item quantities                │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  for each item:                                                 │   │
//! │  │    1. SELECT product                                            │   │
//! │  │    2. UPDATE products SET on_hand = on_hand - qty               │   │
//! │  │       WHERE id = ? AND on_hand >= qty   ← guarded: no oversell  │   │
//! │  │    3. INSERT sale movement (balance_before/after)               │   │
//! │  │                                                                 │   │
//! │  │  4. order_sequences upsert-increment RETURNING next_seq         │   │
//! │  │     → "ORD-240823-001"                                          │   │
//! │  │  5. INSERT order + order_items (price snapshots)                │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← All-or-nothing: a failed item rolls back every deduction,     │
//! │           every movement, and the sequence increment. No order is       │
//! │           ever persisted without a number, and no number is burned      │
//! │           on a failed order.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Refund
//! The refund UPDATE carries `AND refunded_at IS NULL`, so a second
//! refund request matches zero rows and surfaces as `AlreadyRefunded`
//! without touching stock — at-most-once restoration per order.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::inventory::{fetch_product_tx, insert_movement, shortage_error};
use yuandi_core::order_number::{business_date, date_key, format_order_no};
use yuandi_core::pccc::validate_pccc;
use yuandi_core::validation::{validate_customer_name, validate_quantity};
use yuandi_core::{
    order_total_krw, stock, CoreError, NewOrder, Order, OrderItem, OrderStatus, ValidationError,
    MAX_ORDER_ITEMS,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order: validates, deducts stock, allocates the order
    /// number, and persists the order with price snapshots — all in one
    /// transaction.
    ///
    /// ## Errors
    /// - `DbError::Domain(CoreError::Pccc(_))` - malformed customs code
    /// - `DbError::Domain(CoreError::InsufficientStock {..})` - any item short
    /// - `DbError::NotFound` - unknown or soft-deleted product
    /// - `DbError::ConnectionFailed` / `PoolExhausted` - store unreachable;
    ///   nothing is persisted
    pub async fn create(&self, new: NewOrder) -> DbResult<Order> {
        // ---- Validation (before touching the database) ----
        if new.items.is_empty() {
            return Err(CoreError::EmptyOrder.into());
        }
        if new.items.len() > MAX_ORDER_ITEMS {
            return Err(CoreError::from(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_ORDER_ITEMS as i64,
            })
            .into());
        }
        validate_customer_name(&new.customer_name).map_err(CoreError::from)?;
        for line in &new.items {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }
        let pccc = validate_pccc(&new.pccc_code).map_err(CoreError::from)?;

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        debug!(order_id = %order_id, items = new.items.len(), "Creating order");

        let mut tx = self.pool.begin().await?;

        // ---- Per-item stock deduction + movement ----
        let mut items: Vec<OrderItem> = Vec::with_capacity(new.items.len());
        for line in &new.items {
            let mut product = fetch_product_tx(&mut tx, &line.product_id).await?;
            if !product.is_active {
                return Err(DbError::not_found("Product", &line.product_id));
            }

            // Core ledger op: validates availability and yields the
            // movement with the balance snapshot
            let movement =
                stock::deduct_stock(&mut product, line.quantity, Some("order"), Some(&order_id))?;

            // Guarded decrement: the WHERE clause makes overselling
            // impossible even if another writer slipped in
            let result = sqlx::query(
                r#"
                UPDATE products
                SET on_hand = on_hand - ?2, updated_at = ?3
                WHERE id = ?1 AND on_hand >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(shortage_error(
                    &product.sku,
                    movement.balance_before,
                    line.quantity,
                ));
            }

            insert_movement(&mut *tx, &movement).await?;

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: product.id.clone(),
                sku_snapshot: product.sku.clone(),
                name_snapshot: product.display_name(),
                quantity: line.quantity,
                unit_price_krw: product.sale_price_krw,
                subtotal_krw: product.sale_price_krw * line.quantity,
                created_at: now,
            });
        }

        // ---- Order number: atomic per-day upsert-increment ----
        // Runs inside the same transaction: a later failure returns the
        // sequence, and a sequence failure aborts the order.
        let key = date_key(business_date(now));
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_sequences (date_key, next_seq)
            VALUES (?1, 1)
            ON CONFLICT (date_key) DO UPDATE SET next_seq = next_seq + 1
            RETURNING next_seq
            "#,
        )
        .bind(&key)
        .fetch_one(&mut *tx)
        .await?;
        let order_no = format_order_no(&key, seq as u32);

        // ---- Persist order + items ----
        let order = Order {
            id: order_id.clone(),
            order_no,
            customer_name: new.customer_name,
            customer_phone: new.customer_phone,
            pccc_code: pccc.into_inner(),
            status: OrderStatus::Paid,
            total_krw: order_total_krw(&items),
            memo: new.memo,
            refunded_at: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_no, customer_name, customer_phone, pccc_code,
                status, total_krw, memo, refunded_at,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_no)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.pccc_code)
        .bind(order.status)
        .bind(order.total_krw)
        .bind(&order.memo)
        .bind(order.refunded_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id,
                    sku_snapshot, name_snapshot,
                    quantity, unit_price_krw, subtotal_krw,
                    created_at
                ) VALUES (
                    ?1, ?2, ?3,
                    ?4, ?5,
                    ?6, ?7, ?8,
                    ?9
                )
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.sku_snapshot)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_krw)
            .bind(item.subtotal_krw)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_no = %order.order_no,
            total_krw = order.total_krw,
            items = items.len(),
            "Order created"
        );
        Ok(order)
    }

    /// Marks a PAID order as shipped.
    pub async fn ship(&self, order_id: &str) -> DbResult<Order> {
        self.transition(order_id, OrderStatus::Paid, OrderStatus::Shipped)
            .await
    }

    /// Marks a SHIPPED order as delivered.
    pub async fn deliver(&self, order_id: &str) -> DbResult<Order> {
        self.transition(order_id, OrderStatus::Shipped, OrderStatus::Done)
            .await
    }

    /// Performs a guarded status transition.
    ///
    /// The `WHERE status = ?` clause enforces the state machine in SQL;
    /// zero affected rows means the order is missing or in the wrong
    /// state, distinguished by a follow-up read.
    async fn transition(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<Order> {
        debug!(order_id = %order_id, from = from.as_str(), to = to.as_str(), "Order transition");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(order_id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(order_id).await? {
                None => Err(DbError::not_found("Order", order_id)),
                Some(order) => Err(CoreError::InvalidStatusTransition {
                    order_no: order.order_no,
                    current: order.status.as_str().to_string(),
                    requested: to.as_str().to_string(),
                }
                .into()),
            };
        }

        let order = self
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        info!(order_no = %order.order_no, status = order.status.as_str(), "Order transitioned");
        Ok(order)
    }

    /// Refunds an order: flips it to REFUNDED and restores stock for
    /// every item, in one transaction.
    ///
    /// Idempotency: the UPDATE is guarded on `refunded_at IS NULL`, so
    /// restoration runs at most once per order. A repeat request fails
    /// with [`CoreError::AlreadyRefunded`] and changes nothing.
    pub async fn refund(&self, order_id: &str) -> DbResult<Order> {
        debug!(order_id = %order_id, "Refunding order");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'refunded', refunded_at = ?2, updated_at = ?2
            WHERE id = ?1 AND refunded_at IS NULL
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Look up through the transaction: the pool may have no free
            // connection while it is open
            let existing: Option<Order> = sqlx::query_as(
                r#"
                SELECT
                    id, order_no, customer_name, customer_phone, pccc_code,
                    status, total_krw, memo, refunded_at,
                    created_at, updated_at
                FROM orders
                WHERE id = ?1
                "#,
            )
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;

            return match existing {
                None => Err(DbError::not_found("Order", order_id)),
                Some(order) => Err(CoreError::AlreadyRefunded {
                    order_no: order.order_no,
                }
                .into()),
            };
        }

        // Restore stock per item. Soft-deleted products still restore —
        // their history did not disappear with the listing.
        let items = fetch_items_tx(&mut tx, order_id).await?;
        for item in &items {
            let mut product = fetch_product_tx(&mut tx, &item.product_id).await?;

            let movement =
                stock::restore_stock(&mut product, item.quantity, Some("order"), Some(order_id))?;

            sqlx::query(
                r#"
                UPDATE products
                SET on_hand = on_hand + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            insert_movement(&mut *tx, &movement).await?;
        }

        let order: Order = sqlx::query_as(
            r#"
            SELECT
                id, order_no, customer_name, customer_phone, pccc_code,
                status, total_krw, memo, refunded_at,
                created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(order_no = %order.order_no, items = items.len(), "Order refunded, stock restored");
        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as(
            r#"
            SELECT
                id, order_no, customer_name, customer_phone, pccc_code,
                status, total_krw, memo, refunded_at,
                created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by its business number (e.g., `ORD-240823-001`).
    pub async fn get_by_order_no(&self, order_no: &str) -> DbResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as(
            r#"
            SELECT
                id, order_no, customer_name, customer_phone, pccc_code,
                status, total_krw, memo, refunded_at,
                created_at, updated_at
            FROM orders
            WHERE order_no = ?1
            "#,
        )
        .bind(order_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = sqlx::query_as(
            r#"
            SELECT
                id, order_id, product_id,
                sku_snapshot, name_snapshot,
                quantity, unit_price_krw, subtotal_krw,
                created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists the most recent orders.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let orders: Vec<Order> = sqlx::query_as(
            r#"
            SELECT
                id, order_no, customer_name, customer_phone, pccc_code,
                status, total_krw, memo, refunded_at,
                created_at, updated_at
            FROM orders
            ORDER BY rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Counts all orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fetches order items inside a transaction.
async fn fetch_items_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: &str,
) -> DbResult<Vec<OrderItem>> {
    let items: Vec<OrderItem> = sqlx::query_as(
        r#"
        SELECT
            id, order_id, product_id,
            sku_snapshot, name_snapshot,
            quantity, unit_price_krw, subtotal_krw,
            created_at
        FROM order_items
        WHERE order_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use yuandi_core::validation::validate_order_no;
    use yuandi_core::{CoreError, NewOrder, NewOrderItem, NewProduct, OrderStatus};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Creates a product with the given stock and price and returns its id.
    async fn stocked_product(db: &Database, on_hand: i64, price_krw: i64) -> String {
        let product = db
            .products()
            .create(NewProduct {
                category: "bag".to_string(),
                model: "classic".to_string(),
                color: "black".to_string(),
                brand: "chanel".to_string(),
                cost_cny_fen: 500_000,
                sale_price_krw: price_krw,
                low_stock_threshold: 2,
            })
            .await
            .unwrap();
        if on_hand > 0 {
            db.inventory()
                .receive(&product.id, on_hand, None)
                .await
                .unwrap();
        }
        product.id
    }

    fn order_for(product_id: &str, quantity: i64) -> NewOrder {
        NewOrder {
            customer_name: "김철수".to_string(),
            customer_phone: Some("010-1234-5678".to_string()),
            pccc_code: "p123456789012".to_string(),
            memo: None,
            items: vec![NewOrderItem {
                product_id: product_id.to_string(),
                quantity,
            }],
        }
    }

    fn is_insufficient_stock(err: &DbError) -> bool {
        matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        )
    }

    #[tokio::test]
    async fn test_create_order_happy_path() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 10, 1_500_000).await;

        let order = db.orders().create(order_for(&product_id, 3)).await.unwrap();

        assert!(validate_order_no(&order.order_no).is_ok());
        assert!(order.order_no.ends_with("-001"));
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.total_krw, 4_500_000);
        // Customs code is normalized on the way in
        assert_eq!(order.pccc_code, "P123456789012");
        assert!(order.refunded_at.is_none());

        // Stock deducted
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 7);

        // Items carry price snapshots
        let items = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].unit_price_krw, 1_500_000);
        assert_eq!(items[0].subtotal_krw, 4_500_000);

        // Ledger recorded the sale and agrees with the live row
        let history = db.inventory().history(&product_id, 10).await.unwrap();
        assert_eq!(history[0].quantity, -3);
        assert_eq!(history[0].balance_after, 7);
        assert_eq!(
            db.inventory().latest_balance(&product_id).await.unwrap(),
            Some(7)
        );
    }

    #[tokio::test]
    async fn test_order_numbers_increment_within_a_day() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 10, 100_000).await;

        let a = db.orders().create(order_for(&product_id, 1)).await.unwrap();
        let b = db.orders().create(order_for(&product_id, 1)).await.unwrap();
        let c = db.orders().create(order_for(&product_id, 1)).await.unwrap();

        assert!(a.order_no.ends_with("-001"));
        assert!(b.order_no.ends_with("-002"));
        assert!(c.order_no.ends_with("-003"));

        // Same date prefix on all three
        assert_eq!(&a.order_no[..10], &b.order_no[..10]);
        assert_eq!(&b.order_no[..10], &c.order_no[..10]);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejects_and_rolls_back() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 3, 100_000).await;

        let err = db
            .orders()
            .create(order_for(&product_id, 5))
            .await
            .unwrap_err();
        assert!(is_insufficient_stock(&err), "{err:?}");

        // Nothing persisted: stock, orders, ledger all untouched
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 3);
        assert_eq!(db.orders().count().await.unwrap(), 0);
        let history = db.inventory().history(&product_id, 10).await.unwrap();
        assert_eq!(history.len(), 1); // only the inbound seed
    }

    #[tokio::test]
    async fn test_deduct_to_zero_then_next_order_fails() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 10, 100_000).await;

        db.orders().create(order_for(&product_id, 10)).await.unwrap();
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 0);

        let err = db
            .orders()
            .create(order_for(&product_id, 1))
            .await
            .unwrap_err();
        match &err {
            DbError::Domain(core) => assert_eq!(core.shortage(), Some(1)),
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multi_item_failure_rolls_back_earlier_items() {
        let db = test_db().await;
        let plenty = stocked_product(&db, 10, 100_000).await;
        let scarce = stocked_product(&db, 1, 200_000).await;

        let mut new = order_for(&plenty, 5);
        new.items.push(NewOrderItem {
            product_id: scarce.clone(),
            quantity: 2,
        });

        let err = db.orders().create(new).await.unwrap_err();
        assert!(is_insufficient_stock(&err));

        // The first item's deduction was rolled back with the rest
        let p = db.products().get_by_id(&plenty).await.unwrap().unwrap();
        assert_eq!(p.on_hand, 10);
        let s = db.products().get_by_id(&scarce).await.unwrap().unwrap();
        assert_eq!(s.on_hand, 1);
        assert_eq!(db.orders().count().await.unwrap(), 0);

        // The failed attempt did not burn an order number
        let ok = db.orders().create(order_for(&plenty, 1)).await.unwrap();
        assert!(ok.order_no.ends_with("-001"));
    }

    #[tokio::test]
    async fn test_multi_item_order_totals() {
        let db = test_db().await;
        let a = stocked_product(&db, 10, 100_000).await;
        let b = stocked_product(&db, 10, 250_000).await;

        let mut new = order_for(&a, 2);
        new.items.push(NewOrderItem {
            product_id: b.clone(),
            quantity: 1,
        });

        let order = db.orders().create(new).await.unwrap();
        assert_eq!(order.total_krw, 450_000);

        let items = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            order.total_krw,
            items.iter().map(|i| i.subtotal_krw).sum::<i64>()
        );
    }

    #[tokio::test]
    async fn test_malformed_pccc_rejected_before_any_write() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 10, 100_000).await;

        let mut new = order_for(&product_id, 1);
        new.pccc_code = "123456789012".to_string(); // missing P

        let err = db.orders().create(new).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Pccc(_))), "{err:?}");

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 10);
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let db = test_db().await;

        let new = NewOrder {
            customer_name: "김철수".to_string(),
            customer_phone: None,
            pccc_code: "P123456789012".to_string(),
            memo: None,
            items: vec![],
        };

        let err = db.orders().create(new).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyOrder)));
    }

    #[tokio::test]
    async fn test_ship_and_deliver_flow() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 5, 100_000).await;
        let order = db.orders().create(order_for(&product_id, 1)).await.unwrap();

        // Delivering before shipping violates the state machine
        let err = db.orders().deliver(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));

        let shipped = db.orders().ship(&order.id).await.unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);

        let done = db.orders().deliver(&order.id).await.unwrap();
        assert_eq!(done.status, OrderStatus::Done);

        // Shipping again from DONE is rejected
        assert!(db.orders().ship(&order.id).await.is_err());
    }

    #[tokio::test]
    async fn test_refund_restores_stock() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 10, 100_000).await;
        let order = db.orders().create(order_for(&product_id, 4)).await.unwrap();

        let refunded = db.orders().refund(&order.id).await.unwrap();
        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert!(refunded.refunded_at.is_some());

        // Round trip: deduct 4, restore 4
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 10);

        // Ledger shows the refund movement on top
        let history = db.inventory().history(&product_id, 10).await.unwrap();
        assert_eq!(history[0].quantity, 4);
        assert_eq!(history[0].balance_after, 10);
    }

    #[tokio::test]
    async fn test_double_refund_is_rejected_without_double_restore() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 10, 100_000).await;
        let order = db.orders().create(order_for(&product_id, 4)).await.unwrap();

        db.orders().refund(&order.id).await.unwrap();

        let err = db.orders().refund(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::AlreadyRefunded { .. })
        ));

        // Stock restored exactly once
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 10);
    }

    #[tokio::test]
    async fn test_refund_after_shipping() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 5, 100_000).await;
        let order = db.orders().create(order_for(&product_id, 2)).await.unwrap();

        db.orders().ship(&order.id).await.unwrap();
        db.orders().deliver(&order.id).await.unwrap();

        // REFUNDED may follow any prior state
        let refunded = db.orders().refund(&order.id).await.unwrap();
        assert_eq!(refunded.status, OrderStatus::Refunded);

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 5);
    }

    #[tokio::test]
    async fn test_refund_restores_soft_deleted_product() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 5, 100_000).await;
        let order = db.orders().create(order_for(&product_id, 2)).await.unwrap();

        db.products().soft_delete(&product_id).await.unwrap();
        db.orders().refund(&order.id).await.unwrap();

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.on_hand, 5);
        assert!(!product.is_active);
    }

    #[tokio::test]
    async fn test_lookup_by_order_no() {
        let db = test_db().await;
        let product_id = stocked_product(&db, 5, 100_000).await;
        let order = db.orders().create(order_for(&product_id, 1)).await.unwrap();

        let found = db
            .orders()
            .get_by_order_no(&order.order_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, order.id);

        assert!(db
            .orders()
            .get_by_order_no("ORD-000101-999")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_order_operations() {
        let db = test_db().await;

        assert!(matches!(
            db.orders().ship("no-such-order").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            db.orders().refund("no-such-order").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}

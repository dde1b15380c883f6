//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## SKU Uniqueness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Catalog Entry: Check-and-Retry Loop                     │
//! │                                                                         │
//! │  create(NewProduct)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  generate_sku(...) ──► INSERT                                          │
//! │       │                   │                                             │
//! │       │        UNIQUE constraint failed: products.sku?                 │
//! │       │                   │                                             │
//! │       │      yes ─────────┴── regenerate (fresh salt) and retry        │
//! │       ▼                                                                 │
//! │  Product persisted with a DB-unique SKU                                │
//! │                                                                         │
//! │  The generator's hash suffix makes collisions rare; the UNIQUE index   │
//! │  plus this loop makes them impossible to persist.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use yuandi_core::sku::generate_sku;
use yuandi_core::validation::validate_price;
use yuandi_core::{CoreError, NewProduct, Product};

/// Attempts before giving up on SKU generation.
/// One collision is already unlikely; five in a row means something is
/// broken (e.g., a stuck clock and a broken RNG at once).
const MAX_SKU_ATTEMPTS: u32 = 5;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.create(new_product).await?;
/// let found = repo.get_by_sku(&product.sku).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product from catalog input, synthesizing its SKU.
    ///
    /// Retries with a fresh SKU when the UNIQUE index rejects a
    /// collision. Stock starts at zero; units arrive via
    /// [`crate::repository::inventory::InventoryRepository::receive`].
    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        validate_price(new.cost_cny_fen).map_err(CoreError::from)?;
        validate_price(new.sale_price_krw).map_err(CoreError::from)?;

        let mut attempt = 1;
        loop {
            let sku = generate_sku(&new.category, &new.model, &new.color, &new.brand);
            let product = Product::from_new(new.clone(), sku);

            match self.insert(&product).await {
                Ok(()) => return Ok(product),
                Err(e) if e.is_unique_violation_on("sku") && attempt < MAX_SKU_ATTEMPTS => {
                    warn!(sku = %product.sku, attempt, "SKU collision, regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Inserts a fully-built product row.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, category, model, color, brand,
                cost_cny_fen, sale_price_krw,
                on_hand, low_stock_threshold,
                is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8,
                ?9, ?10,
                ?11, ?12, ?13
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.category)
        .bind(&product.model)
        .bind(&product.color)
        .bind(&product.brand)
        .bind(product.cost_cny_fen)
        .bind(product.sale_price_krw)
        .bind(product.on_hand)
        .bind(product.low_stock_threshold)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
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
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product: Option<Product> = sqlx::query_as(
            r#"
            SELECT
                id, sku, category, model, color, brand,
                cost_cny_fen, sale_price_krw,
                on_hand, low_stock_threshold,
                is_active, created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by substring match over sku, brand,
    /// model, and category.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial); empty returns recent actives
    /// * `limit` - Maximum results to return
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{}%", query);

        let products: Vec<Product> = sqlx::query_as(
            r#"
            SELECT
                id, sku, category, model, color, brand,
                cost_cny_fen, sale_price_krw,
                on_hand, low_stock_threshold,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
              AND (sku LIKE ?1 OR brand LIKE ?1 OR model LIKE ?1 OR category LIKE ?1)
            ORDER BY brand, model
            LIMIT ?2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products (no search filter).
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = sqlx::query_as(
            r#"
            SELECT
                id, sku, category, model, color, brand,
                cost_cny_fen, sale_price_krw,
                on_hand, low_stock_threshold,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products at or below their low-stock threshold,
    /// emptiest first.
    pub async fn list_low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = sqlx::query_as(
            r#"
            SELECT
                id, sku, category, model, color, brand,
                cost_cny_fen, sale_price_krw,
                on_hand, low_stock_threshold,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1 AND on_hand <= low_stock_threshold
            ORDER BY on_hand ASC, brand, model
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Historical orders still reference this product, and a refund on
    /// such an order must still restore its stock.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use yuandi_core::sku::matches_generated_format;
    use yuandi_core::NewProduct;

    fn new_product(brand: &str, model: &str) -> NewProduct {
        NewProduct {
            category: "bag".to_string(),
            model: model.to_string(),
            color: "black".to_string(),
            brand: brand.to_string(),
            cost_cny_fen: 500_000,
            sale_price_krw: 1_500_000,
            low_stock_threshold: 5,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_generates_valid_sku() {
        let db = test_db().await;

        let product = db
            .products()
            .create(new_product("Chanel", "Classic Flap"))
            .await
            .unwrap();

        assert!(matches_generated_format(&product.sku), "{}", product.sku);
        assert_eq!(product.on_hand, 0);
        assert!(product.is_active);

        let found = db.products().get_by_sku(&product.sku).await.unwrap();
        assert_eq!(found.unwrap().id, product.id);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_prices() {
        let db = test_db().await;

        let mut bad = new_product("Chanel", "Classic");
        bad.sale_price_krw = -1;

        assert!(db.products().create(bad).await.is_err());
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_identical_inputs_get_distinct_skus() {
        let db = test_db().await;

        // Same catalog fields twice: the hash suffix keeps SKUs apart
        let a = db
            .products()
            .create(new_product("Chanel", "Classic"))
            .await
            .unwrap();
        let b = db
            .products()
            .create(new_product("Chanel", "Classic"))
            .await
            .unwrap();

        assert_ne!(a.sku, b.sku);
        assert_eq!(db.products().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_and_low_stock() {
        let db = test_db().await;
        let products = db.products();

        let chanel = products.create(new_product("Chanel", "Classic")).await.unwrap();
        products.create(new_product("Gucci", "Marmont")).await.unwrap();

        let hits = products.search("chan", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, chanel.id);

        // Everything starts at zero stock, so everything is low
        let low = products.list_low_stock(10).await.unwrap();
        assert_eq!(low.len(), 2);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_listings() {
        let db = test_db().await;
        let products = db.products();

        let p = products.create(new_product("Chanel", "Classic")).await.unwrap();
        products.soft_delete(&p.id).await.unwrap();

        assert_eq!(products.count().await.unwrap(), 0);
        assert!(products.search("chanel", 10).await.unwrap().is_empty());

        // Still reachable by direct lookup (orders reference it)
        let found = products.get_by_id(&p.id).await.unwrap().unwrap();
        assert!(!found.is_active);
    }

    #[tokio::test]
    async fn test_soft_delete_missing_product() {
        let db = test_db().await;
        assert!(db.products().soft_delete("no-such-id").await.is_err());
    }
}

//! # Product Repository
//!
//! Database operations for the catalog and its stock counter.
//!
//! ## Key Operations
//! - Keyword search (title / SKU / description) with paging
//! - CRUD operations
//! - Stock updates as atomic deltas
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, compute, write back                                   │
//! │     SELECT stock ...;  UPDATE products SET stock = 7 WHERE id = ?      │
//! │                                                                         │
//! │  ✅ CORRECT: delta in one statement                                    │
//! │     UPDATE products SET stock = stock + ?delta WHERE id = ?            │
//! │                                                                         │
//! │  ✅ SALES: conditional decrement                                       │
//! │     UPDATE products SET stock = stock - ?q                             │
//! │     WHERE id = ? AND stock >= ?q                                       │
//! │     0 rows → missing product or insufficient stock                     │
//! │                                                                         │
//! │  CHECK (typeof(stock) = 'integer' AND stock >= 0) backs all of them.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use kestrel_core::validation::{
    normalize_sku, validate_new_product, validate_product_patch, validate_quantity,
    validate_search_query,
};
use kestrel_core::{
    CoreError, NewProduct, Page, PageRequest, Product, ProductPatch, ValidationError,
    DEFAULT_REORDER_LEVEL, DEFAULT_UNIT,
};

const PRODUCT_COLUMNS: &str = r#"
    id, title, sku, description, category, unit, price, cost, stock,
    reorder_level, is_active, created_by, created_at, updated_at
"#;

const SEARCH_FILTER: &str = r#"
    ?1 IS NULL
    OR title LIKE ?1 ESCAPE '\'
    OR sku LIKE ?1 ESCAPE '\'
    OR description LIKE ?1 ESCAPE '\'
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let page = repo.find(Some("mouse"), PageRequest::default()).await?;
/// let product = repo.find_by_id("uuid-here").await?;
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

    /// Creates a product.
    ///
    /// ## Arguments
    /// * `input` - Product fields; the SKU is trimmed and upper-cased
    /// * `created_by` - Id of the acting user
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product
    /// * `Err(DbError::UniqueViolation)` - SKU already exists (any case)
    /// * `Err(DbError::Domain)` - Validation failed
    pub async fn create(&self, input: NewProduct, created_by: Option<&str>) -> DbResult<Product> {
        validate_new_product(&input)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            sku: normalize_sku(&input.sku),
            description: input.description,
            category: input.category.trim().to_string(),
            unit: input.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            price: input.price,
            cost: input.cost.unwrap_or(0.0),
            stock: input.stock.unwrap_or(0),
            reorder_level: input.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            is_active: input.is_active.unwrap_or(true),
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, sku, description, category, unit,
                price, cost, stock, reorder_level, is_active,
                created_by, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.stock)
        .bind(product.reorder_level)
        .bind(product.is_active)
        .bind(&product.created_by)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate("sku", &product.sku))?;

        Ok(product)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Gets a product by ID, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by SKU (normalized before lookup).
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1"
        ))
        .bind(normalize_sku(sku))
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products, newest first, optionally filtered by a keyword.
    ///
    /// ## Arguments
    /// * `keyword` - Case-insensitive substring of title, SKU or description
    /// * `page` - Page and limit
    pub async fn find(&self, keyword: Option<&str>, page: PageRequest) -> DbResult<Page<Product>> {
        let keyword = validate_search_query(keyword)?;
        let pattern = like_pattern(keyword.as_deref());

        debug!(keyword = ?keyword, page = page.page, limit = page.limit, "Listing products");

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products WHERE {SEARCH_FILTER}"
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE {SEARCH_FILTER}
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(&pattern)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(products, total, page))
    }

    /// Applies a partial update. Unset fields keep their current value;
    /// `Some(None)` clears the description.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::UniqueViolation)` - New SKU belongs to another product
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        validate_product_patch(&patch)?;

        debug!(id = %id, "Updating product");

        let sku = patch.sku.as_deref().map(normalize_sku);

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                title = COALESCE(?2, title),
                sku = COALESCE(?3, sku),
                description = CASE WHEN ?13 THEN ?4 ELSE description END,
                category = COALESCE(?5, category),
                unit = COALESCE(?6, unit),
                price = COALESCE(?7, price),
                cost = COALESCE(?8, cost),
                stock = COALESCE(?9, stock),
                reorder_level = COALESCE(?10, reorder_level),
                is_active = COALESCE(?11, is_active),
                updated_at = ?12
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(&sku)
        .bind(patch.description.as_ref().and_then(|v| v.as_deref()))
        .bind(patch.category.as_deref().map(str::trim))
        .bind(&patch.unit)
        .bind(patch.price)
        .bind(patch.cost)
        .bind(patch.stock)
        .bind(patch.reorder_level)
        .bind(patch.is_active)
        .bind(Utc::now())
        .bind(patch.description.is_some())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate("sku", sku.as_deref().unwrap_or_default()))?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds `delta` (negative to remove) to a product's stock.
    ///
    /// ## Returns
    /// * `Ok(i64)` - Stock after the change
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(CoreError::InsufficientStock)` - Stock would drop below zero
    /// * `Err(DbError::Domain)` - `|delta|` above `MAX_QUANTITY`, or stock
    ///   would overflow
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        if delta != 0 {
            validate_quantity(delta.saturating_abs())?;
        }

        let result: Result<Option<i64>, DbError> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING stock
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from);

        match result {
            Ok(Some(stock)) => Ok(stock),
            Ok(None) => Err(DbError::not_found("Product", id)),
            Err(DbError::CheckViolation(_)) if delta > 0 => Err(stock_overflow()),
            Err(DbError::CheckViolation(_)) => {
                let product = self.find_by_id(id).await?;
                Err(CoreError::InsufficientStock {
                    product: product.title,
                    available: product.stock,
                    requested: -delta,
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes a product. Documents referencing it keep the dangling id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Adds received units to a product.
///
/// ## Returns
/// `false` when the product no longer exists (nothing was changed).
pub(crate) async fn receive_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::CheckViolation(_) => stock_overflow(),
        other => other,
    })?;

    Ok(result.rows_affected() > 0)
}

fn stock_overflow() -> DbError {
    ValidationError::AboveMaximum {
        field: "stock".to_string(),
        max: i64::MAX,
    }
    .into()
}

/// Takes sold units from a product if enough are on hand.
///
/// ## Returns
/// * `Ok(())` - Stock decremented
/// * `Err(DbError::NotFound)` - No such product
/// * `Err(CoreError::InsufficientStock)` - `stock < quantity`, nothing changed
pub(crate) async fn take_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    // Nothing changed: tell a missing product from a short one.
    match fetch_product(conn, id).await? {
        None => Err(DbError::not_found("Product", id)),
        Some(product) => Err(CoreError::InsufficientStock {
            product: product.title,
            available: product.stock,
            requested: quantity,
        }
        .into()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn mouse() -> NewProduct {
        NewProduct {
            title: "Wireless Mouse".to_string(),
            sku: "mou-002".to_string(),
            category: "Electronics".to_string(),
            price: 1200.0,
            cost: Some(800.0),
            stock: Some(5),
            ..Default::default()
        }
    }

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_normalizes_sku() {
        let repo = repo().await;
        let product = repo.create(mouse(), Some("u1")).await.unwrap();

        assert_eq!(product.sku, "MOU-002");
        assert_eq!(product.unit, "pcs");
        assert_eq!(product.reorder_level, 10);
        assert!(product.is_active);

        let stored = repo.find_by_id(&product.id).await.unwrap();
        assert_eq!(stored.stock, 5);
        assert_eq!(stored.created_by.as_deref(), Some("u1"));
        assert!(repo.get_by_sku("mou-002").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sku_is_unique_ignoring_case() {
        let repo = repo().await;
        repo.create(mouse(), None).await.unwrap();

        let mut dup = mouse();
        dup.sku = " MOU-002 ".to_string();
        let err = repo.create(dup, None).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, ref value } if field == "sku" && value == "MOU-002"));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_adjust_stock_is_floored_at_zero() {
        let repo = repo().await;
        let product = repo.create(mouse(), None).await.unwrap();

        assert_eq!(repo.adjust_stock(&product.id, 3).await.unwrap(), 8);
        assert_eq!(repo.adjust_stock(&product.id, -8).await.unwrap(), 0);

        let err = repo.adjust_stock(&product.id, -1).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 0, requested: 1, .. })
        ));
        assert_eq!(repo.find_by_id(&product.id).await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_overflow() {
        let repo = repo().await;
        let product = repo.create(mouse(), None).await.unwrap();

        let err = repo.adjust_stock(&product.id, i64::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::AboveMaximum { .. }))
        ));
        assert!(repo.adjust_stock(&product.id, i64::MIN).await.is_err());

        // The column refuses the REAL an overflowing sum turns into.
        sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
            .bind(&product.id)
            .bind(i64::MAX - 1)
            .execute(&repo.pool)
            .await
            .unwrap();
        let err = repo.adjust_stock(&product.id, 5).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::AboveMaximum { ref field, .. }))
                if field == "stock"
        ));
        assert_eq!(repo.find_by_id(&product.id).await.unwrap().stock, i64::MAX - 1);
    }

    #[tokio::test]
    async fn test_adjust_stock_missing_product() {
        let repo = repo().await;
        let err = repo.adjust_stock("nope", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_pages_newest_first() {
        let repo = repo().await;
        for i in 0..15 {
            let mut p = mouse();
            p.sku = format!("SKU-{i:02}");
            p.title = format!("Item {i}");
            repo.create(p, None).await.unwrap();
        }

        let first = repo.find(None, PageRequest::new(Some(0), Some(10))).await.unwrap();
        assert_eq!(first.total, 15);
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.data[0].title, "Item 14");

        let second = repo.find(None, PageRequest::new(Some(1), Some(10))).await.unwrap();
        assert_eq!(second.data.len(), 5);
        assert_eq!(second.data[4].title, "Item 0");
    }

    #[tokio::test]
    async fn test_find_matches_keyword_case_insensitively() {
        let repo = repo().await;
        repo.create(mouse(), None).await.unwrap();
        let mut keyboard = mouse();
        keyboard.title = "Mechanical Keyboard".to_string();
        keyboard.sku = "KEY-003".to_string();
        repo.create(keyboard, None).await.unwrap();

        let page = repo.find(Some("MOUSE"), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].sku, "MOU-002");

        let page = repo.find(Some("key-"), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);

        let page = repo.find(Some("%"), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_update_patches_only_given_fields() {
        let repo = repo().await;
        let product = repo.create(mouse(), None).await.unwrap();

        let updated = repo
            .update(
                &product.id,
                ProductPatch {
                    price: Some(999.0),
                    sku: Some("mou-002b".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 999.0);
        assert_eq!(updated.sku, "MOU-002B");
        assert_eq!(updated.title, "Wireless Mouse");
        assert_eq!(updated.stock, 5);

        let err = repo.update("missing", ProductPatch::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let repo = repo().await;
        let mut input = mouse();
        input.description = Some("2.4 GHz".to_string());
        let product = repo.create(input, None).await.unwrap();

        let kept = repo
            .update(&product.id, ProductPatch { price: Some(1100.0), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("2.4 GHz"));

        let cleared = repo
            .update(&product.id, ProductPatch { description: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.price, 1100.0);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let product = repo.create(mouse(), None).await.unwrap();

        repo.delete(&product.id).await.unwrap();
        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&product.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}

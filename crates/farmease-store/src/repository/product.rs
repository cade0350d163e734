//! # Product Repository
//!
//! The local product catalog: an offline stand-in for the hosted backend's
//! `products` table, used by the local data service, the seller listing
//! commands and the seed binary.
//!
//! ## Batched Stock Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart page opens with ids [a, b, c]                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT id, stock FROM products WHERE id IN (?, ?, ?)   ← ONE query    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { a: 3, c: 12 }      ids with no row are simply absent                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use farmease_core::{Product, ProductCategory};

const PRODUCT_COLUMNS: &str =
    "id, name, price, image, category, stock, description, seller_id";

/// Row shape of the `products` table.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: String,
    image: String,
    category: String,
    stock: i64,
    description: Option<String>,
    seller_id: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            image: row.image,
            category: ProductCategory::from_name(&row.category),
            stock: row.stock,
            description: row.description,
            seller_id: row.seller_id,
        }
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product. Fails with `UniqueViolation` if the id exists.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price, image, category, stock,
                description, seller_id, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.price)
        .bind(&product.image)
        .bind(product.category.display_name())
        .bind(product.stock)
        .bind(&product.description)
        .bind(&product.seller_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("id", product.id.clone()),
            other => other,
        })?;

        Ok(())
    }

    /// Gets a product by its id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Product::from))
    }

    /// Replaces the listing fields of a product owned by `product.seller_id`.
    ///
    /// The row must exist and belong to that seller; otherwise nothing
    /// changes and the result is `NotFound`.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, price = ?3, image = ?4, category = ?5, stock = ?6,
                description = ?7, updated_at = ?8
            WHERE id = ?1 AND seller_id IS ?9
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.price)
        .bind(&product.image)
        .bind(product.category.display_name())
        .bind(product.stock)
        .bind(&product.description)
        .bind(Utc::now().to_rfc3339())
        .bind(&product.seller_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Lists one seller's products, sorted by name.
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = ?1 ORDER BY name"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(seller_id = %seller_id, count = rows.len(), "Listed seller products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Lists products of one category, sorted by name.
    pub async fn list_by_category(
        &self,
        category: &ProductCategory,
        limit: u32,
    ) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?1 ORDER BY name LIMIT ?2"
        ))
        .bind(category.display_name())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(category = %category, count = rows.len(), "Listed products by category");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Substring search on the product name, ASCII case-insensitive like
    /// SQLite's `LIKE`. An empty query lists everything, sorted by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name LIKE ?1 ESCAPE '\\' \
             ORDER BY name LIMIT ?2"
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Search returned products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Current stock for each id in `ids`, in one query.
    ///
    /// Ids with no catalog row are absent from the result.
    pub async fn stock_levels(&self, ids: &[String]) -> DbResult<HashMap<String, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, stock FROM products WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<(String, i64)> = builder.build_query_as().fetch_all(&self.pool).await?;

        debug!(requested = ids.len(), found = rows.len(), "Fetched stock levels");
        Ok(rows.into_iter().collect())
    }

    /// Overwrites the stock level of a product.
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<()> {
        debug!(id = %id, stock = %stock, "Setting stock");

        let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
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

    /// Counts catalog rows (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

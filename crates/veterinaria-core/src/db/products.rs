//! Category and product database operations.

use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{parse_decimal, Database, DbError, DbResult};
use crate::models::{Category, InventorySummary, Product, ProductType};

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.category_id, p.name, p.description, p.product_type, p.price, p.code,
    p.stock, p.active_ingredient, p.concentration, p.laboratory, p.active,
    p.created_at, p.updated_at
"#;

impl Database {
    // =========================================================================
    // Categories
    // =========================================================================

    /// Insert a new category.
    pub fn insert_category(&self, category: &Category) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO categories (id, name, description, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                category.id,
                category.name,
                category.description,
                category.active,
                category.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a category by ID.
    pub fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, name, description, active, created_at FROM categories WHERE id = ?",
                [id],
                category_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List categories ordered by name.
    pub fn list_categories(&self, active_only: bool) -> DbResult<Vec<Category>> {
        let sql = if active_only {
            "SELECT id, name, description, active, created_at FROM categories WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, name, description, active, created_at FROM categories ORDER BY name"
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], category_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Mark category as inactive (soft delete).
    pub fn deactivate_category(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("UPDATE categories SET active = 0 WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Whether the category exists and is active.
    pub fn category_is_active(&self, id: &str) -> DbResult<bool> {
        let active: Option<bool> = self
            .conn
            .query_row("SELECT active FROM categories WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(active.unwrap_or(false))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Insert a new product.
    pub fn insert_product(&self, product: &Product) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO products (
                id, category_id, name, description, product_type, price, code,
                stock, active_ingredient, concentration, laboratory, active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                product.id,
                product.category_id,
                product.name,
                product.description,
                product.product_type.as_str(),
                product.price.to_string(),
                product.code,
                product.stock,
                product.active_ingredient,
                product.concentration,
                product.laboratory,
                product.active,
                product.created_at,
                product.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing product.
    pub fn update_product(&self, product: &Product) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE products SET
                category_id = ?2,
                name = ?3,
                description = ?4,
                product_type = ?5,
                price = ?6,
                code = ?7,
                stock = ?8,
                active_ingredient = ?9,
                concentration = ?10,
                laboratory = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                product.id,
                product.category_id,
                product.name,
                product.description,
                product.product_type.as_str(),
                product.price.to_string(),
                product.code,
                product.stock,
                product.active_ingredient,
                product.concentration,
                product.laboratory,
                product.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a product by ID.
    pub fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products p WHERE p.id = ?", PRODUCT_COLUMNS);
        self.conn
            .query_row(&sql, [id], product_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get a product by its (normalized) code.
    pub fn get_product_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products p WHERE p.code = ?", PRODUCT_COLUMNS);
        self.conn
            .query_row(&sql, [code], product_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List products, newest first.
    pub fn list_products(&self, active_only: bool) -> DbResult<Vec<Product>> {
        let filter = if active_only { "WHERE p.active = 1" } else { "" };
        let sql = format!(
            "SELECT {} FROM products p {} ORDER BY p.created_at DESC, p.name",
            PRODUCT_COLUMNS, filter
        );
        self.collect_products(&sql, params![])
    }

    /// Active products of one category, ordered by name.
    pub fn list_products_in_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products p WHERE p.category_id = ? AND p.active = 1 ORDER BY p.name",
            PRODUCT_COLUMNS
        );
        self.collect_products(&sql, params![category_id])
    }

    /// Search active products by name, description or code using FTS5 (BM25 ranking).
    ///
    /// An empty query lists the active products instead.
    pub fn search_products(
        &self,
        query: &str,
        category_id: Option<&str>,
        limit: usize,
    ) -> DbResult<Vec<Product>> {
        let escaped_query = escape_fts_query(query);
        if escaped_query.is_empty() {
            let mut products = match category_id {
                Some(id) => self.list_products_in_category(id)?,
                None => self.list_products(true)?,
            };
            products.truncate(limit);
            return Ok(products);
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM products p
            JOIN products_fts fts ON p.rowid = fts.rowid
            WHERE products_fts MATCH ?1
            AND p.active = 1
            AND (?2 IS NULL OR p.category_id = ?2)
            ORDER BY bm25(products_fts)
            LIMIT ?3
            "#,
            PRODUCT_COLUMNS
        );
        self.collect_products(&sql, params![escaped_query, category_id, limit as i64])
    }

    /// Mark product as inactive (soft delete).
    pub fn deactivate_product(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE products SET active = 0, updated_at = ?2 WHERE id = ?1",
            params![id, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(rows_affected > 0)
    }

    /// Whether another product (active or not) already uses this code.
    pub fn product_code_taken(&self, code: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE code = ?1 AND (?2 IS NULL OR id <> ?2)",
            params![code, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Inventory figures for the active products of a category.
    pub fn inventory_summary(&self, category_id: &str) -> DbResult<InventorySummary> {
        let products = self.list_products_in_category(category_id)?;

        Ok(InventorySummary {
            category_id: category_id.to_string(),
            product_count: products.len() as u32,
            total_value: products.iter().map(|p| p.price).sum::<Decimal>(),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count() as u32,
            in_stock_count: products.iter().filter(|p| p.in_stock()).count() as u32,
        })
    }

    fn collect_products(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> DbResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, product_row)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(row?.try_into()?);
        }
        Ok(products)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        active: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Intermediate row struct for database mapping.
struct ProductRow {
    id: String,
    category_id: String,
    name: String,
    description: Option<String>,
    product_type: String,
    price: String,
    code: String,
    stock: u32,
    active_ingredient: Option<String>,
    concentration: Option<String>,
    laboratory: Option<String>,
    active: bool,
    created_at: String,
    updated_at: String,
}

fn product_row(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        product_type: row.get(4)?,
        price: row.get(5)?,
        code: row.get(6)?,
        stock: row.get(7)?,
        active_ingredient: row.get(8)?,
        concentration: row.get(9)?,
        laboratory: row.get(10)?,
        active: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let product_type = ProductType::from_code(&row.product_type).ok_or_else(|| {
            DbError::Constraint(format!("Unknown product type: {}", row.product_type))
        })?;

        Ok(Product {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            product_type,
            price: parse_decimal(&row.price)?,
            code: row.code,
            stock: row.stock,
            active_ingredient: row.active_ingredient,
            concentration: row.concentration,
            laboratory: row.laboratory,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Strip FTS5 operators and turn each remaining word into a quoted prefix match.
///
/// Punctuation splits words the same way the FTS tokenizer does, so a code
/// such as `CARP-100` becomes `"CARP"* "100"*`.
fn escape_fts_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| format!("\"{}\"*", word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> (Database, Category) {
        let db = Database::open_in_memory().unwrap();
        let category = Category::new("Medicamentos".into(), "Fármacos de uso veterinario".into());
        db.insert_category(&category).unwrap();
        (db, category)
    }

    fn make_product(category: &Category, name: &str, code: &str, price: i64, stock: u32) -> Product {
        let mut product = Product::new(
            category.id.clone(),
            name.into(),
            ProductType::Medication,
            code.into(),
            Decimal::from(price),
        );
        product.stock = stock;
        product.active_ingredient = Some("Carprofeno".into());
        product.concentration = Some("100mg".into());
        product.laboratory = Some("Zoetis".into());
        product
    }

    #[test]
    fn test_insert_and_get() {
        let (db, category) = setup_db();

        let mut product = make_product(&category, "Rimadyl 100mg", "RIM-100", 25990, 12);
        product.description = Some("Antiinflamatorio para perros".into());
        db.insert_product(&product).unwrap();

        let retrieved = db.get_product(&product.id).unwrap().unwrap();
        assert_eq!(retrieved, product);

        let by_code = db.get_product_by_code("RIM-100").unwrap().unwrap();
        assert_eq!(by_code.id, product.id);
    }

    #[test]
    fn test_update_product() {
        let (db, category) = setup_db();

        let mut product = make_product(&category, "Rimadyl 100mg", "RIM-100", 25990, 12);
        db.insert_product(&product).unwrap();

        product.price = Decimal::new(2799050, 2);
        product.stock = 3;
        assert!(db.update_product(&product).unwrap());

        let retrieved = db.get_product(&product.id).unwrap().unwrap();
        assert_eq!(retrieved.price, Decimal::new(2799050, 2));
        assert_eq!(retrieved.stock, 3);
    }

    #[test]
    fn test_search_products() {
        let (db, category) = setup_db();

        let mut carprofen = make_product(&category, "Carprofeno 100mg", "CARP-100", 15990, 4);
        carprofen.description = Some("Antiinflamatorio no esteroidal".into());
        db.insert_product(&carprofen).unwrap();
        let meloxicam = make_product(&category, "Meloxicam 1.5mg/mL", "MELOX-15", 12990, 8);
        db.insert_product(&meloxicam).unwrap();

        // By name prefix
        let results = db.search_products("carp", None, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, carprofen.id);

        // By description
        let results = db.search_products("esteroidal", None, 10).unwrap();
        assert_eq!(results.len(), 1);

        // By code with punctuation
        let results = db.search_products("MELOX-15", Some(&category.id), 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, meloxicam.id);

        // Empty query lists everything active
        assert_eq!(db.search_products("  ", Some(&category.id), 10).unwrap().len(), 2);

        // Soft-deleted products disappear from search
        db.deactivate_product(&carprofen.id).unwrap();
        assert!(db.search_products("carp", None, 10).unwrap().is_empty());
        assert!(!db.get_product(&carprofen.id).unwrap().unwrap().active);
    }

    #[test]
    fn test_product_code_taken_excludes_self() {
        let (db, category) = setup_db();

        let product = make_product(&category, "Rimadyl 100mg", "RIM-100", 25990, 12);
        db.insert_product(&product).unwrap();

        assert!(db.product_code_taken("RIM-100", None).unwrap());
        assert!(!db.product_code_taken("RIM-100", Some(&product.id)).unwrap());
        assert!(!db.product_code_taken("RIM-200", None).unwrap());
    }

    #[test]
    fn test_duplicate_code_is_unique_violation() {
        let (db, category) = setup_db();

        db.insert_product(&make_product(&category, "Rimadyl 100mg", "RIM-100", 25990, 12))
            .unwrap();
        let err = db
            .insert_product(&make_product(&category, "Rimadyl copia", "RIM-100", 25990, 12))
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn test_inventory_summary() {
        let (db, category) = setup_db();

        db.insert_product(&make_product(&category, "Producto A", "A-001", 1000, 0)).unwrap();
        db.insert_product(&make_product(&category, "Producto B", "B-001", 2000, 5)).unwrap();
        db.insert_product(&make_product(&category, "Producto C", "C-001", 3000, 40)).unwrap();

        let summary = db.inventory_summary(&category.id).unwrap();
        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.total_value, Decimal::from(6000));
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.in_stock_count, 2);
    }

    #[test]
    fn test_category_activity() {
        let (db, category) = setup_db();
        assert!(db.category_is_active(&category.id).unwrap());

        db.deactivate_category(&category.id).unwrap();
        assert!(!db.category_is_active(&category.id).unwrap());
        assert!(db.list_categories(true).unwrap().is_empty());
        assert!(!db.category_is_active("missing").unwrap());
    }

    #[test]
    fn test_escape_fts_query() {
        assert_eq!(escape_fts_query("CARP-100"), "\"CARP\"* \"100\"*");
        assert_eq!(escape_fts_query("\"drop\" OR *"), "\"drop\"* \"OR\"*");
        assert_eq!(escape_fts_query(" - "), "");
    }
}

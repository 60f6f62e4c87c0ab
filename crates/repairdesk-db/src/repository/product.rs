//! SurrealDB implementation of [`ProductRepository`].

use repairdesk_core::error::ShopResult;
use repairdesk_core::ids::{EntityKind, SharedAllocator};
use repairdesk_core::models::product::{CreateProduct, Product};
use repairdesk_core::repository::{DEFAULT_SEARCH_LIMIT, ProductRepository};
use repairdesk_core::validate;
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use super::allocate;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProductRow {
    name: String,
    description: Option<String>,
    unit_price: Decimal,
    quantity: u32,
}

#[derive(Debug, SurrealValue)]
struct ProductRowWithId {
    record_id: String,
    name: String,
    description: Option<String>,
    unit_price: Decimal,
    quantity: u32,
}

impl ProductRow {
    fn into_product(self, id: String) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

impl From<ProductRowWithId> for Product {
    fn from(row: ProductRowWithId) -> Self {
        Product {
            id: row.record_id,
            name: row.name,
            description: row.description,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

/// SurrealDB implementation of the Product repository.
#[derive(Clone)]
pub struct SurrealProductRepository<C: Connection> {
    db: Surreal<C>,
    allocator: SharedAllocator,
}

impl<C: Connection> SurrealProductRepository<C> {
    pub fn new(db: Surreal<C>, allocator: SharedAllocator) -> Self {
        Self { db, allocator }
    }
}

impl<C: Connection> ProductRepository for SurrealProductRepository<C> {
    async fn create(&self, input: CreateProduct) -> ShopResult<Product> {
        let input = input.normalize()?;
        let id = allocate(&self.allocator, EntityKind::Product)?;

        let result = self
            .db
            .query(
                "CREATE type::record('product', $id) SET \
                 name = $name, description = $description, \
                 unit_price = $unit_price, quantity = $quantity",
            )
            .bind(("id", id.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("unit_price", input.unit_price.unwrap_or(Decimal::ZERO)))
            .bind(("quantity", input.quantity.unwrap_or(0)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("product", id.clone()))?;

        info!(id = %id, "Product registered");
        Ok(row.into_product(id))
    }

    async fn get_by_id(&self, id: &str) -> ShopResult<Product> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('product', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("product", id))?;

        Ok(row.into_product(id.to_string()))
    }

    async fn search(&self, term: Option<&str>) -> ShopResult<Vec<Product>> {
        let term = validate::search_term(term);
        debug!(term = ?term, "Searching products");

        let query = match term {
            Some(term) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM product \
                     WHERE string::contains(string::lowercase(name), $term) \
                     OR string::contains(string::lowercase(description ?? ''), $term)",
                )
                .bind(("term", term)),
            None => self
                .db
                .query("SELECT meta::id(id) AS record_id, * FROM product LIMIT $limit")
                .bind(("limit", DEFAULT_SEARCH_LIMIT)),
        };

        let mut result = query.await.map_err(DbError::from)?;
        let rows: Vec<ProductRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

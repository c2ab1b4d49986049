use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

/// Enumeration of errors for operations on the product store.
/// Errors originate from sqlx and are wrapped by us to provide additional context.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection failed with: {error}")]
    Connection { error: sqlx::Error },
    #[error("{command} query failed with: {error}")]
    Query { command: String, error: sqlx::Error },
}

/// A single inventory record, as stored in the `products` table and as
/// serialized in listing responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    #[sqlx(rename = "product_id")]
    pub id: String,
    pub name: String,
    pub cost: i32,
    pub quantity: i32,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Read access to the inventory. The listing handler only ever takes a bulk
/// snapshot, so this is the entire surface.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

const LIST_PRODUCTS: &str =
    "SELECT product_id, name, cost, quantity, date_created, date_updated FROM products";

/// A `ProductStore` backed by a PostgreSQL connection pool.
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Open a pool against `url` and fail fast if the store is unreachable.
    /// No retries, no reconnects.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|error| StoreError::Connection { error })?;

        Ok(Self { pool })
    }

    pub fn new_from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        sqlx::query_as::<_, Product>(LIST_PRODUCTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| StoreError::Query {
                command: "list_products".to_owned(),
                error,
            })
    }
}

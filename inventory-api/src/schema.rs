//! Operator-triggered schema collaborators for the `products` table.
//!
//! Both routines are idempotent so an operator can re-run them safely.

use sqlx::postgres::PgPool;

use crate::store::StoreError;

const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    product_id   TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    cost         INT NOT NULL,
    quantity     INT NOT NULL,
    date_created TIMESTAMPTZ NOT NULL DEFAULT now(),
    date_updated TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const SEED_PRODUCTS: &str = r#"
INSERT INTO products (product_id, name, cost, quantity) VALUES
    ('a2b0639f-2cc6-44b8-b97b-15d69dbb511e', 'Comic Books', 50, 42),
    ('72f8b983-3eb4-48db-9ed0-e45cc6bd716b', 'McDonalds Toys', 75, 120)
ON CONFLICT (product_id) DO NOTHING
"#;

/// Bring the store schema up to the expected shape.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(CREATE_PRODUCTS_TABLE)
        .execute(pool)
        .await
        .map_err(|error| StoreError::Query {
            command: "migrate".to_owned(),
            error,
        })?;

    Ok(())
}

/// Populate baseline inventory data. The migration runs first so seeding an
/// empty database works in a single invocation.
pub async fn seed(pool: &PgPool) -> Result<(), StoreError> {
    migrate(pool).await?;

    sqlx::query(SEED_PRODUCTS)
        .execute(pool)
        .await
        .map_err(|error| StoreError::Query {
            command: "seed".to_owned(),
            error,
        })?;

    Ok(())
}

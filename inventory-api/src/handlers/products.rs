use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::store::{Product, ProductStore};

/// Serve a read-only snapshot of all inventory records as a JSON array.
///
/// Failures are request-local: the caller gets an empty 500 response and the
/// detail only lands in the logs.
pub async fn list(
    State(store): State<Arc<dyn ProductStore>>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    let start = Instant::now();

    match store.list_products().await {
        Ok(products) => {
            metrics::histogram!("inventory_api_list_products")
                .record(start.elapsed().as_secs_f64());

            Ok(Json(products))
        }
        Err(e) => {
            error!("error querying products: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{self, Request, StatusCode},
    };
    use chrono::Utc;
    use futures::future::join_all;
    use http_body_util::BodyExt; // for `collect`
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`

    use crate::handlers::app;
    use crate::store::StoreError;

    struct MemoryStore {
        products: Vec<Product>,
    }

    #[async_trait::async_trait]
    impl ProductStore for MemoryStore {
        async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
            Ok(self.products.clone())
        }
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl ProductStore for FailingStore {
        async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Query {
                command: "list_products".to_owned(),
                error: sqlx::Error::PoolClosed,
            })
        }
    }

    fn sample_products() -> Vec<Product> {
        let now = Utc::now();

        vec![
            Product {
                id: "a2b0639f-2cc6-44b8-b97b-15d69dbb511e".to_owned(),
                name: "Comic Books".to_owned(),
                cost: 50,
                quantity: 42,
                date_created: now,
                date_updated: now,
            },
            Product {
                id: "72f8b983-3eb4-48db-9ed0-e45cc6bd716b".to_owned(),
                name: "McDonalds Toys".to_owned(),
                cost: 75,
                quantity: 120,
                date_created: now,
                date_updated: now,
            },
        ]
    }

    #[tokio::test]
    async fn list_returns_products_as_json_array() {
        let products = sample_products();
        let app = app(Arc::new(MemoryStore {
            products: products.clone(),
        }));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let listed: Vec<Product> = serde_json::from_slice(&body).unwrap();
        assert_eq!(listed, products);
    }

    #[tokio::test]
    async fn list_returns_empty_array_not_null_for_zero_rows() {
        let app = app(Arc::new(MemoryStore {
            products: Vec::new(),
        }));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"[]");
    }

    #[tokio::test]
    async fn query_failure_yields_500_with_empty_body() {
        let app = app(Arc::new(FailingStore));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn concurrent_requests_do_not_interfere() {
        let products = sample_products();
        let app = app(Arc::new(MemoryStore {
            products: products.clone(),
        }));

        let responses = join_all((0..16).map(|_| {
            app.clone()
                .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        }))
        .await;

        for response in responses {
            let response = response.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let listed: Vec<Product> = serde_json::from_slice(&body).unwrap();
            assert_eq!(listed.len(), products.len());
        }
    }
}

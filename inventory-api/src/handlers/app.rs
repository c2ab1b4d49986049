use std::sync::Arc;

use axum::Router;

use crate::store::ProductStore;

use super::products;

/// Every method and path is answered by the product listing; there is no
/// routing surface beyond the fallback.
pub fn app(store: Arc<dyn ProductStore>) -> Router {
    Router::new().fallback(products::list).with_state(store)
}

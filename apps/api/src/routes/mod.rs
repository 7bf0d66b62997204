//! # Routes
//!
//! One module per resource. Each exposes `router()`, nested under `/api`.
//!
//! ## Handler Shape
//! ```text
//! async fn create(State(state), user: AuthUser, body) -> ApiResult<...> {
//!     user.authorize(Resource::X, Action::Create)?;   ← 403
//!     let x = state.db.xs().create(body, ..).await?;  ← 400/404/409
//!     Ok((StatusCode::CREATED, Json(x)))
//! }
//! ```

pub mod auth;
pub mod customers;
pub mod grn;
pub mod health;
pub mod invoices;
pub mod products;
pub mod purchase_orders;
pub mod reports;
pub mod sales_orders;
pub mod suppliers;
pub mod users;

use std::sync::Arc;

use axum::Router;
use serde::{Deserialize, Serialize};

use crate::AppState;
use kestrel_core::PageRequest;

pub fn router() -> Router<Arc<AppState>> {
    let api = Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/suppliers", suppliers::router())
        .nest("/sales-orders", sales_orders::router())
        .nest("/purchase-orders", purchase_orders::router())
        .nest("/grn", grn::router())
        .nest("/invoices", invoices::router())
        .nest("/reports", reports::router())
        .merge(health::router());

    Router::new()
        .merge(health::root_router())
        .nest("/api", api)
}

/// Query string accepted by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Only products, customers and suppliers search on it.
    pub keyword: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}

/// `{ "message": "..." }` body returned by deletes.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

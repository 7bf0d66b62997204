//! # Kestrel API
//!
//! REST server for Kestrel ERP.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Surface (/api)                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Identity      │  │  Catalog       │  │  Documents                 ││
//! │  │                │  │                │  │                            ││
//! │  │ • /auth        │  │ • /products    │  │ • /purchase-orders         ││
//! │  │ • /users       │  │ • /customers   │  │ • /grn                     ││
//! │  │                │  │ • /suppliers   │  │ • /sales-orders            ││
//! │  │                │  │                │  │ • /invoices                ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌──────────────────────────────────────────────┐  │
//! │  │  /reports      │  │  /health                                     │  │
//! │  └────────────────┘  └──────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Every route except /auth/register, /auth/login and /health needs a    │
//! │  bearer token; mutations are gated by kestrel_core::access.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Common environment variables:
//! - `KESTREL_SERVER__PORT` - HTTP port (default: 5000)
//! - `KESTREL_DATABASE__PATH` - SQLite file (default: kestrel.db)
//! - `KESTREL_AUTH__JWT_SECRET` - Secret for JWT signing

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use kestrel_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_lifetime_secs,
        );
        AppState { db, jwt, config }
    }
}

/// Builds the full router with request tracing applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    routes::router()
        .layer(axum::middleware::from_fn(middleware::request_tracing_middleware))
        .with_state(state)
}

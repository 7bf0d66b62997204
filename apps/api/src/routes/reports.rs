//! Read-only reports for admin and inventory roles.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;
use kestrel_core::{Action, InventoryItem, ProfitSummary, Resource, SalesByDay};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sales", get(sales))
        .route("/inventory", get(inventory))
        .route("/profit", get(profit))
}

async fn sales(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<SalesByDay>>> {
    user.authorize(Resource::Reports, Action::Read)?;

    Ok(Json(state.db.reports().sales_by_day().await?))
}

async fn inventory(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    user.authorize(Resource::Reports, Action::Read)?;

    Ok(Json(state.db.reports().inventory().await?))
}

async fn profit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<ProfitSummary>> {
    user.authorize(Resource::Reports, Action::Read)?;

    Ok(Json(state.db.reports().profit().await?))
}

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::{ListQuery, MessageResponse};
use crate::AppState;
use kestrel_core::{Action, NewSalesOrder, Page, Resource, SalesOrder, SalesOrderStatusUpdate};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).delete(remove))
        .route("/{id}/status", put(update_status))
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<SalesOrder>>> {
    user.authorize(Resource::SalesOrders, Action::Read)?;
    let Query(query) = query?;

    Ok(Json(state.db.sales_orders().find(query.page_request()).await?))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<SalesOrder>> {
    user.authorize(Resource::SalesOrders, Action::Read)?;

    Ok(Json(state.db.sales_orders().find_by_id(&id).await?))
}

/// `POST /api/sales-orders`
///
/// Takes stock for every line or for none of them. A line asking for more
/// than is on hand fails the whole order with `400 INSUFFICIENT_STOCK`.
async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<NewSalesOrder>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SalesOrder>)> {
    user.authorize(Resource::SalesOrders, Action::Create)?;
    let Json(input) = body?;

    let order = state
        .db
        .sales()
        .create_sales_order(input, Some(&user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<SalesOrderStatusUpdate>, JsonRejection>,
) -> ApiResult<Json<SalesOrder>> {
    user.authorize(Resource::SalesOrders, Action::Update)?;
    let Json(update) = body?;

    Ok(Json(state.db.sales_orders().update_status(&id, update).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    user.authorize(Resource::SalesOrders, Action::Delete)?;

    state.db.sales_orders().delete(&id).await?;
    Ok(Json(MessageResponse::new("Sales order removed")))
}

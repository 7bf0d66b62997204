//! Purchase orders. Creating one never touches stock; stock moves only
//! when goods are received against it through `/api/grn`.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::{ListQuery, MessageResponse};
use crate::AppState;
use kestrel_core::{
    Action, NewPurchaseOrder, Page, PurchaseOrder, PurchaseOrderStatus, Resource,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update_status).delete(remove))
}

/// Body of `PUT /api/purchase-orders/{id}`. Any status may follow any other.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    status: PurchaseOrderStatus,
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<PurchaseOrder>>> {
    user.authorize(Resource::PurchaseOrders, Action::Read)?;
    let Query(query) = query?;

    Ok(Json(
        state.db.purchase_orders().find(query.page_request()).await?,
    ))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseOrder>> {
    user.authorize(Resource::PurchaseOrders, Action::Read)?;

    Ok(Json(state.db.purchase_orders().find_by_id(&id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<NewPurchaseOrder>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PurchaseOrder>)> {
    user.authorize(Resource::PurchaseOrders, Action::Create)?;
    let Json(input) = body?;

    let order = state
        .db
        .purchasing()
        .create_purchase_order(input, Some(&user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<StatusBody>, JsonRejection>,
) -> ApiResult<Json<PurchaseOrder>> {
    user.authorize(Resource::PurchaseOrders, Action::Update)?;
    let Json(body) = body?;

    Ok(Json(
        state
            .db
            .purchase_orders()
            .update_status(&id, body.status)
            .await?,
    ))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    user.authorize(Resource::PurchaseOrders, Action::Delete)?;

    state.db.purchase_orders().delete(&id).await?;
    Ok(Json(MessageResponse::new("Purchase order removed")))
}

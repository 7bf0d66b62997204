//! Goods receipts. Posting one adds the received quantities to stock and
//! advances the purchase order's receipt tally in the same transaction.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::ListQuery;
use crate::AppState;
use kestrel_core::{Action, Grn, NewGrn, Page, Resource};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Grn>>> {
    user.authorize(Resource::GoodsReceipts, Action::Read)?;
    let Query(query) = query?;

    Ok(Json(state.db.grns().find(query.page_request()).await?))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Grn>> {
    user.authorize(Resource::GoodsReceipts, Action::Read)?;

    Ok(Json(state.db.grns().find_by_id(&id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<NewGrn>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Grn>)> {
    user.authorize(Resource::GoodsReceipts, Action::Create)?;
    let Json(input) = body?;

    let (grn, _order) = state
        .db
        .purchasing()
        .record_goods_receipt(input, Some(&user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(grn)))
}

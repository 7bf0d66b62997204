use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::{ListQuery, MessageResponse};
use crate::AppState;
use kestrel_core::{Action, NewSupplier, Page, Resource, Supplier, SupplierPatch};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Supplier>>> {
    user.authorize(Resource::Suppliers, Action::Read)?;
    let Query(query) = query?;

    let page = state
        .db
        .suppliers()
        .find(query.keyword(), query.page_request())
        .await?;
    Ok(Json(page))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Supplier>> {
    user.authorize(Resource::Suppliers, Action::Read)?;

    Ok(Json(state.db.suppliers().find_by_id(&id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<NewSupplier>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    user.authorize(Resource::Suppliers, Action::Create)?;
    let Json(input) = body?;

    let supplier = state.db.suppliers().create(input, Some(&user.id)).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<SupplierPatch>, JsonRejection>,
) -> ApiResult<Json<Supplier>> {
    user.authorize(Resource::Suppliers, Action::Update)?;
    let Json(patch) = body?;

    Ok(Json(state.db.suppliers().update(&id, patch).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    user.authorize(Resource::Suppliers, Action::Delete)?;

    state.db.suppliers().delete(&id).await?;
    Ok(Json(MessageResponse::new("Supplier removed")))
}

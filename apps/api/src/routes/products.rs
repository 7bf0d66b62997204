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
use kestrel_core::{Action, NewProduct, Page, Product, ProductPatch, Resource};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

/// `GET /api/products?keyword=&page=&limit=`, newest first.
async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Product>>> {
    user.authorize(Resource::Products, Action::Read)?;
    let Query(query) = query?;

    let page = state
        .db
        .products()
        .find(query.keyword(), query.page_request())
        .await?;
    Ok(Json(page))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    user.authorize(Resource::Products, Action::Read)?;

    Ok(Json(state.db.products().find_by_id(&id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    user.authorize(Resource::Products, Action::Create)?;
    let Json(input) = body?;

    let product = state.db.products().create(input, Some(&user.id)).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    user.authorize(Resource::Products, Action::Update)?;
    let Json(patch) = body?;

    Ok(Json(state.db.products().update(&id, patch).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    user.authorize(Resource::Products, Action::Delete)?;

    state.db.products().delete(&id).await?;
    Ok(Json(MessageResponse::new("Product removed")))
}

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
use kestrel_core::{Action, Customer, CustomerPatch, NewCustomer, Page, Resource};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Customer>>> {
    user.authorize(Resource::Customers, Action::Read)?;
    let Query(query) = query?;

    let page = state
        .db
        .customers()
        .find(query.keyword(), query.page_request())
        .await?;
    Ok(Json(page))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    user.authorize(Resource::Customers, Action::Read)?;

    Ok(Json(state.db.customers().find_by_id(&id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<NewCustomer>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    user.authorize(Resource::Customers, Action::Create)?;
    let Json(input) = body?;

    let customer = state.db.customers().create(input, Some(&user.id)).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<CustomerPatch>, JsonRejection>,
) -> ApiResult<Json<Customer>> {
    user.authorize(Resource::Customers, Action::Update)?;
    let Json(patch) = body?;

    Ok(Json(state.db.customers().update(&id, patch).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    user.authorize(Resource::Customers, Action::Delete)?;

    state.db.customers().delete(&id).await?;
    Ok(Json(MessageResponse::new("Customer removed")))
}

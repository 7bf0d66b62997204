//! Account management. Admin only: `users` has no entry in the access
//! table, so every action falls through to admin.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::{ListQuery, MessageResponse};
use crate::AppState;
use kestrel_core::{Action, Page, Resource, User, UserPatch};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<User>>> {
    user.authorize(Resource::Users, Action::Read)?;
    let Query(query) = query?;

    Ok(Json(state.db.users().find(query.page_request()).await?))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    user.authorize(Resource::Users, Action::Read)?;

    Ok(Json(state.db.users().find_by_id(&id).await?))
}

async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    user.authorize(Resource::Users, Action::Update)?;
    let Json(patch) = body?;

    Ok(Json(state.db.users().update(&id, patch).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    user.authorize(Resource::Users, Action::Delete)?;

    state.db.users().delete(&id).await?;
    Ok(Json(MessageResponse::new("User removed")))
}

//! Registration, login and the caller's own profile.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;
use kestrel_core::{NewUser, Role, User};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile plus a fresh token, returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

fn auth_response(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let token = state.jwt.generate_access_token(&user.id)?;
    Ok(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        token,
    })
}

/// Self-service sign-up. New accounts are always viewers; an admin
/// grants other roles through `/users`.
async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(body) = body?;

    let user = state
        .db
        .users()
        .create(NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            role: None,
        })
        .await?;

    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(body) = body?;

    let user = state
        .db
        .users()
        .verify_credentials(&body.email, &body.password)
        .await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(auth_response(&state, user)?))
}

async fn me(user: AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}

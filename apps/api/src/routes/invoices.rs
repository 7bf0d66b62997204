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
use kestrel_core::{Action, Invoice, NewInvoice, Page, Resource};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Invoice>>> {
    user.authorize(Resource::Invoices, Action::Read)?;
    let Query(query) = query?;

    Ok(Json(state.db.invoices().find(query.page_request()).await?))
}

async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    user.authorize(Resource::Invoices, Action::Read)?;

    Ok(Json(state.db.invoices().find_by_id(&id).await?))
}

/// `POST /api/invoices`
///
/// Bills an existing sales order. With no `items` the order's lines are
/// copied. The order's payment status is reset to unpaid.
async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<NewInvoice>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    user.authorize(Resource::Invoices, Action::Create)?;
    let Json(input) = body?;

    let invoice = state
        .db
        .sales()
        .create_invoice(input, Some(&user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

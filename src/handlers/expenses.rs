//! Protected expense and profile endpoints

use serde::Serialize;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::auth::RequestContext;
use crate::core::SharedState;
use crate::error::AuthError;
use crate::handlers::rejection::reject;
use crate::storage::ExpenseDraft;

/// Public view of the calling user
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub name: String,
    pub email: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expense_count: usize,
}

pub async fn list(ctx: RequestContext, state: SharedState) -> Result<impl Reply, Rejection> {
    let expenses = state.expenses.list_own(&ctx).await.map_err(reject)?;
    Ok(warp::reply::json(&expenses))
}

pub async fn create(
    ctx: RequestContext,
    draft: ExpenseDraft,
    state: SharedState,
) -> Result<impl Reply, Rejection> {
    let expense = state.expenses.create(&ctx, draft).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&expense),
        StatusCode::CREATED,
    ))
}

pub async fn update(
    id: u64,
    ctx: RequestContext,
    draft: ExpenseDraft,
    state: SharedState,
) -> Result<impl Reply, Rejection> {
    let expense = state
        .expenses
        .update(&ctx, id, draft)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&expense))
}

pub async fn delete(
    id: u64,
    ctx: RequestContext,
    state: SharedState,
) -> Result<impl Reply, Rejection> {
    state.expenses.delete(&ctx, id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(ctx: RequestContext, state: SharedState) -> Result<impl Reply, Rejection> {
    let auth = ctx
        .require()
        .map_err(|e| reject(e.into()))?;

    // The account may have been removed since the authorizer ran
    let record = state
        .credentials
        .find_by_identity(auth.identity())
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(AuthError::Unauthenticated.into()))?;

    let expense_count = state.expenses.count_own(&ctx).await.map_err(reject)?;

    Ok(warp::reply::json(&ProfileResponse {
        name: record.name,
        email: record.email,
        created_at: record.created_at,
        expense_count,
    }))
}

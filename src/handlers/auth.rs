//! Public login and registration endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warp::{Rejection, Reply};

use crate::core::SharedState;
use crate::handlers::rejection::reject;

/// Body of `/api/auth/register`
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `/api/auth/login`
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register(
    body: RegisterRequest,
    state: SharedState,
) -> Result<impl Reply, Rejection> {
    state
        .authenticator
        .register_with_email(&body.name, &body.password, body.email.as_deref())
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

pub async fn login(body: CredentialsRequest, state: SharedState) -> Result<impl Reply, Rejection> {
    let session = state
        .authenticator
        .login(&body.name, &body.password)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&LoginResponse {
        expires_at: session.token.expires_at(),
        token: session.token.into_string(),
        username: session.username,
    }))
}

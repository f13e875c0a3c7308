//! Maps crate errors and warp rejections to JSON error responses

use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

use crate::error::{AuthError, ExpenseAuthError};

/// Crate error carried through warp's rejection system
#[derive(Debug)]
pub struct ApiError(pub ExpenseAuthError);

impl Reject for ApiError {}

pub fn reject(err: ExpenseAuthError) -> Rejection {
    warp::reject::custom(ApiError(err))
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Status code and client-facing message for a crate error
pub fn status_for(err: &ExpenseAuthError) -> (StatusCode, String) {
    match err {
        ExpenseAuthError::Auth(auth) => {
            let status = match auth {
                AuthError::DuplicateIdentity => StatusCode::CONFLICT,
                AuthError::UnknownIdentity
                | AuthError::BadCredential
                | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AuthError::Unauthorized => StatusCode::FORBIDDEN,
            };
            (status, auth.public_message().to_string())
        }
        ExpenseAuthError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
        ExpenseAuthError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        other => {
            log::error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(ApiError(inner)) = err.find::<ApiError>() {
        status_for(inner)
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        log::warn!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { error: message }),
        status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;

    #[test]
    fn test_login_failures_look_identical() {
        let unknown = status_for(&AuthError::UnknownIdentity.into());
        let bad = status_for(&AuthError::BadCredential.into());
        assert_eq!(unknown, bad);
        assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AuthError::DuplicateIdentity.into()).0, StatusCode::CONFLICT);
        assert_eq!(status_for(&AuthError::Unauthorized.into()).0, StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&ExpenseAuthError::NotFound("expense 1".to_string())).0,
            StatusCode::NOT_FOUND
        );
        let (status, message) = status_for(&TokenError::Signing("boom".to_string()).into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("boom"));
    }
}

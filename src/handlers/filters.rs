//! Reusable warp filters

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use warp::http::header::AUTHORIZATION;
use warp::http::HeaderMap;
use warp::path::FullPath;
use warp::Filter;

use crate::auth::RequestContext;
use crate::core::SharedState;

/// Maximum accepted JSON body size
const MAX_BODY_BYTES: u64 = 16 * 1024;

// Helper function to include shared state in request
pub fn with_state(
    state: SharedState,
) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Run the request authorizer and extract the resulting context.
///
/// Never rejects: a missing, malformed or non-UTF-8 Authorization header
/// simply yields an anonymous context.
pub fn with_identity(
    state: SharedState,
) -> impl Filter<Extract = (RequestContext,), Error = Infallible> + Clone {
    warp::path::full()
        .and(warp::header::headers_cloned())
        .and_then(move |path: FullPath, headers: HeaderMap| {
            let authorizer = state.authorizer.clone();
            async move {
                let auth_header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
                let ctx = authorizer.authenticate(path.as_str(), auth_header).await;
                Ok::<_, Infallible>(ctx)
            }
        })
}

pub fn json_body<T: DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

//! HTTP surface of the service

pub mod auth;
pub mod expenses;
pub mod filters;
pub mod rejection;

use warp::http::header::{HeaderMap, HeaderValue};
use warp::{Filter, Reply};

use crate::core::SharedState;
use filters::{json_body, with_identity, with_state};

pub use rejection::handle_rejection;

/// Strict security headers for JSON API responses
fn api_security_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers
}

/// All routes, with rejections already recovered into JSON errors
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
    let register = warp::path!("api" / "auth" / "register")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(auth::register);

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(auth::login);

    let me = warp::path!("api" / "users" / "me")
        .and(warp::get())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(expenses::me);

    let list = warp::path!("api" / "expenses")
        .and(warp::get())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(expenses::list);

    let create = warp::path!("api" / "expenses")
        .and(warp::post())
        .and(with_identity(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(expenses::create);

    let update = warp::path!("api" / "expenses" / u64)
        .and(warp::put())
        .and(with_identity(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(expenses::update);

    let delete = warp::path!("api" / "expenses" / u64)
        .and(warp::delete())
        .and(with_identity(state.clone()))
        .and(with_state(state))
        .and_then(expenses::delete);

    let health = warp::path!("health").and(warp::get()).map(|| "OK");

    register
        .or(login)
        .or(me)
        .or(list)
        .or(create)
        .or(update)
        .or(delete)
        .or(health)
        .recover(handle_rejection)
        .with(warp::reply::with::headers(api_security_headers()))
}

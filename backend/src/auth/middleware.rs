use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use cookie::Cookie;

use super::{AUTH_COOKIE, AUTH_COOKIE_VALUE};

fn has_auth_cookie(request: &Request<Body>) -> bool {
    let Some(header_value) = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    Cookie::split_parse(header_value)
        .filter_map(Result::ok)
        .any(|cookie| cookie.name() == AUTH_COOKIE && cookie.value() == AUTH_COOKIE_VALUE)
}

/// Gate for everything except the auth endpoint and the health check: a
/// valid `auth` cookie or a 401.
pub async fn require_auth(
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if has_auth_cookie(&request) {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

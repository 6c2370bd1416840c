use axum::http::header;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::Error;
use super::{removal_cookie, session_cookie, verify_site_password};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Checks the submitted password against SITE_PASSWORD_HASH and sets the
/// auth cookie on success.
pub async fn login(Json(request): Json<LoginRequest>) -> Result<(HeaderMap, Json<Value>), Error> {
    let hash = std::env::var("SITE_PASSWORD_HASH")
        .map_err(|_| Error::Config("SITE_PASSWORD_HASH"))?;

    if !verify_site_password(&request.password, &hash) {
        warn!("rejected login attempt");
        return Err(Error::InvalidPassword);
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie()
            .to_string()
            .parse()
            .map_err(|_| Error::Config("auth cookie"))?,
    );
    Ok((headers, Json(json!({ "success": true }))))
}

pub async fn logout() -> Result<(HeaderMap, Json<Value>), Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        removal_cookie()
            .to_string()
            .parse()
            .map_err(|_| Error::Config("auth cookie"))?,
    );
    Ok((headers, Json(json!({ "success": true }))))
}

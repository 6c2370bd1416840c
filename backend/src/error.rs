use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum Error {
    Database(sqlx::Error),
    NotFound(&'static str),
    Validation(String),
    Conflict(&'static str),
    InvalidPassword,
    Config(&'static str),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Record not found"),
            other => Error::Database(other),
        }
    }
}

/// Postgres unique_violation, used to turn duplicate inserts into 409s.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::NotFound(what) => write!(f, "{}", what),
            Self::Validation(msg) => write!(f, "{}", msg),
            Self::Conflict(msg) => write!(f, "{}", msg),
            Self::InvalidPassword => write!(f, "Invalid password"),
            Self::Config(what) => write!(f, "Missing configuration: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            Self::Database(e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            Self::NotFound(what) => (StatusCode::NOT_FOUND, what.to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.to_string()),
            Self::InvalidPassword => (StatusCode::UNAUTHORIZED, "Invalid password".to_string()),
            Self::Config(what) => {
                tracing::error!("missing configuration: {}", what);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

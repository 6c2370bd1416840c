use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use axum::http::header::HeaderName;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::middleware::require_auth;
use crate::auth::routes::{login, logout};
use crate::services::employee_service::{
    create_employee, delete_employee, list_employees, update_employee,
};
use crate::services::participant_service::{delete_participant, update_participant};
use crate::services::session_service::{create_session, delete_session, list_sessions};
use crate::wheel_service::WheelRegistry;

mod auth;
mod error;
mod logging;
mod models;
mod services;
mod wheel_service;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub wheels: WheelRegistry,
}

pub async fn health_check() -> impl IntoResponse {
    "OK"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::setup();
    dotenvy::from_path(".env").ok();

    let pool = PgPool::connect_with(
        std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set")
            .parse::<sqlx::postgres::PgConnectOptions>()?
            .to_owned(),
    )
    .await
    .expect("Failed to create pool");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState {
        pool,
        wheels: WheelRegistry::new(),
    };

    let protected_routes = Router::new()
        .route("/api/employees", get(list_employees).post(create_employee).patch(update_employee).delete(delete_employee))
        .route("/api/sessions", get(list_sessions).post(create_session).delete(delete_session))
        .route("/api/participants", patch(update_participant).delete(delete_participant))
        .nest("/api/wheel", wheel_service::create_router())
        .layer(middleware::from_fn(require_auth));

    let cors = CorsLayer::new()
        .allow_origin(vec![
            "http://127.0.0.1:8080".parse::<HeaderValue>().unwrap(),
            "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
        ])
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::OPTIONS, Method::DELETE])
        .allow_headers(vec![
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true);

    let app = Router::new()
        .route("/api/health_check", get(health_check))
        .route("/api/auth", post(login).delete(logout))
        .merge(protected_routes)
        .layer(cors)
        .with_state(state);

    let addr = std::env::var("BIND_ADDR")
        .ok()
        .and_then(|raw| raw.parse::<SocketAddr>().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// src/main.rs

use std::env;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod db;
mod kpi;
mod models;
mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub jwt: auth::JwtKeys,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::connect().await?;
    let jwt = auth::JwtKeys::from_env();
    let state = AppState { pool, jwt };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Root API router
    let api = Router::new()
        // health
        .route("/health", get(routes::health::health))
        // auth
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route("/api/v1/auth/me", get(routes::auth::me))
        // operators
        .route(
            "/api/v1/operators",
            post(routes::operators::create_operator).get(routes::operators::list_operators),
        )
        .route(
            "/api/v1/operators/:id",
            get(routes::operators::get_operator)
                .patch(routes::operators::rename_operator)
                .delete(routes::operators::delete_operator),
        )
        // shift reports (upsert keyed on operator+date+slot)
        .route(
            "/api/v1/reports",
            post(routes::reports::upsert_report).get(routes::reports::list_reports),
        )
        .route(
            "/api/v1/reports/:id",
            get(routes::reports::get_report).delete(routes::reports::delete_report),
        )
        // computed KPI summaries
        .route("/api/v1/kpi/daily", get(routes::kpi::daily))
        .route("/api/v1/kpi/monthly", get(routes::kpi::monthly))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Port (axum 0.7 style)
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080); // default 8080

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("API listening on http://{addr}");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}

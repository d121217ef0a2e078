use std::net::SocketAddr;

use axum::{routing::{get, post}, Json, Router};
use lidar_placement::{solve, SolveRequest, SolveResponse};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 3002;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("LIDAR_SOLVER_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = Router::new()
        .route("/health", get(health))
        .route("/solve", post(solve_handler));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "lidar-solver listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "lidar-solver" }))
}

async fn solve_handler(Json(request): Json<SolveRequest>) -> Json<SolveResponse> {
    // the core solve is synchronous and CPU-bound; run it on a blocking
    // thread so a slow solve can't stall the executor's other connections.
    let response = tokio::task::spawn_blocking(move || solve(&request))
        .await
        .unwrap_or_else(|join_err| {
            tracing::error!(%join_err, "solve task panicked");
            SolveResponse::failure("internal error while solving", 0, Vec::new())
        });
    Json(response)
}

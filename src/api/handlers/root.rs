use axum::{http::StatusCode, response::IntoResponse};
use tracing::instrument;

// axum handler for the bare root, answers liveness probes
#[instrument]
pub async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    )
}

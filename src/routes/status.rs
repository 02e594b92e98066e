//! Status endpoints served next to the admin: liveness, readiness with a database ping, build info.

use crate::state::AppState;
use crate::store::ping;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    models: Option<usize>,
}

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    admin: String,
}

async fn live() -> Json<StatusBody> {
    Json(StatusBody {
        status: "ok",
        database: None,
        models: None,
    })
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusBody>) {
    let models = Some(state.registry.models().len());
    if ping(&state.pool).await {
        let body = StatusBody {
            status: "ok",
            database: Some("ok"),
            models,
        };
        return (StatusCode::OK, Json(body));
    }
    tracing::warn!("readiness check failed: database unavailable");
    let body = StatusBody {
        status: "degraded",
        database: Some("unavailable"),
        models,
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body))
}

async fn build_info(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        admin: state.settings.index_url(),
    })
}

/// GET /health, GET /ready, GET /version.
pub fn status_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(live))
        .route("/ready", get(ready))
        .route("/version", get(build_info))
        .with_state(state)
}

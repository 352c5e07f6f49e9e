//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: String,
    pub redis: String,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: checks database and Redis connectivity.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            Some(e.to_string())
        }
    };

    let redis = match state.redis.get_multiplexed_async_connection().await {
        Ok(mut conn) => redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .err()
            .map(|e| e.to_string()),
        Err(e) => Some(e.to_string()),
    };
    if let Some(ref e) = redis {
        tracing::warn!(error = %e, "Redis health check failed");
    }

    let healthy = database.is_none() && redis.is_none();
    let describe = |err: Option<String>| match err {
        None => "connected".to_string(),
        Some(e) => format!("error: {e}"),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        ApiResponse::success(HealthStatus {
            status: if healthy { "ok" } else { "degraded" },
            database: describe(database),
            redis: describe(redis),
        }),
    )
}

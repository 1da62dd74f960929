use crate::transport::http::types::{ApiResponse, AppState, HealthStatus};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "DB reachable. Index status and sync counters are informational", body = ApiResponse),
        (status = 503, description = "DB unreachable", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.catalog.store().ping().await;
    let search_index = match state.index.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "search index ping failed");
            format!("unavailable: {}", e)
        }
    };

    let (status, db_status, error) = match &database {
        Ok(()) => (StatusCode::OK, "ok".to_string(), None),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unreachable".to_string(),
            Some(format!("DB ping failed: {}", e)),
        ),
    };

    let health = HealthStatus {
        status: if error.is_none() { "ok" } else { "unhealthy" }.to_string(),
        database: db_status,
        search_index,
        sync: state.catalog.hooks().stats(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (
        status,
        Json(ApiResponse {
            success: error.is_none(),
            data: serde_json::to_value(&health).ok(),
            error,
        }),
    )
}

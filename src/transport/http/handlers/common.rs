use crate::transport::http::error::ApiError;
use crate::transport::http::types::ApiResponse;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Bad id param {}", raw)))
}

pub fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(params)) => Ok(params),
        Err(e) => {
            tracing::debug!(error = %e, "rejected query string");
            Err(ApiError::BadRequest("Malformed query params".to_string()))
        }
    }
}

pub fn body<T>(body: Result<Json<T>, JsonRejection>, expected: &str) -> Result<T, ApiError> {
    body.map(|Json(v)| v).map_err(|e| {
        ApiError::BadRequest(format!("Invalid JSON body: {} (expected: {})", e, expected))
    })
}

/// Wraps `data` in a successful envelope.
pub fn respond<T: Serialize>(status: StatusCode, data: &T) -> Result<Response, ApiError> {
    let data = serde_json::to_value(data)
        .map_err(|e| ApiError::Internal(format!("failed to serialize response: {}", e)))?;
    Ok((status, Json(ApiResponse::ok(data))).into_response())
}

pub fn deleted(message: String) -> Result<Response, ApiError> {
    respond(StatusCode::OK, &serde_json::json!({ "message": message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        match parse_id("abc") {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "Bad id param abc"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}

use crate::app::ModelInput;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{body, deleted, parse_id, query, respond};
use crate::transport::http::types::{ApiResponse, AppState, PageParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

const EXPECTED_BODY: &str =
    "{\"name\": \"...\", \"makeId\": 1, \"bodyStyleId\": 1, \"colorIds\": [1, 2]}";

#[utoipa::path(
    get,
    path = "/models",
    tag = "models",
    params(PageParams),
    responses(
        (status = 200, description = "Page of models with make, body style and available colors", body = ApiResponse),
        (status = 400, description = "Malformed query params", body = ApiResponse)
    )
)]
pub async fn list_models_handler(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let page = state.catalog.list_models(params.paging()).await?;
    respond(StatusCode::OK, &page)
}

#[utoipa::path(
    get,
    path = "/models/{id}",
    tag = "models",
    params(("id" = i64, Path, description = "Model id")),
    responses(
        (status = 200, description = "The model", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse)
    )
)]
pub async fn get_model_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    respond(StatusCode::OK, &state.catalog.get_model(id).await?)
}

#[utoipa::path(
    post,
    path = "/models",
    tag = "models",
    request_body = ModelInput,
    responses(
        (status = 201, description = "Created", body = ApiResponse),
        (status = 400, description = "Missing field", body = ApiResponse),
        (status = 422, description = "Duplicate name or unknown make, body style or color", body = ApiResponse)
    )
)]
pub async fn create_model_handler(
    State(state): State<AppState>,
    request: Result<Json<ModelInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = body(request, EXPECTED_BODY)?;
    let model = state.catalog.create_model(&input).await?;
    respond(StatusCode::CREATED, &model)
}

#[utoipa::path(
    put,
    path = "/models/{id}",
    tag = "models",
    params(("id" = i64, Path, description = "Model id")),
    request_body = ModelInput,
    responses(
        (status = 200, description = "Updated; indexed cars of this model are rewritten", body = ApiResponse),
        (status = 400, description = "Missing field", body = ApiResponse),
        (status = 422, description = "Unknown model or reference", body = ApiResponse)
    )
)]
pub async fn update_model_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<ModelInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let input = body(request, EXPECTED_BODY)?;
    let model = state.catalog.update_model(id, &input).await?;
    respond(StatusCode::OK, &model)
}

#[utoipa::path(
    delete,
    path = "/models/{id}",
    tag = "models",
    params(("id" = i64, Path, description = "Model id")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse),
        (status = 422, description = "Unknown model or cars still reference it", body = ApiResponse)
    )
)]
pub async fn delete_model_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    deleted(state.catalog.delete_model(id).await?)
}

use crate::app::CarInput;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{body, deleted, parse_id, query, respond};
use crate::transport::http::types::{ApiResponse, AppState, PageParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

const EXPECTED_BODY: &str = "{\"modelId\": 1, \"colorId\": 1, \"year\": 2020}";

#[utoipa::path(
    get,
    path = "/cars",
    tag = "cars",
    params(PageParams),
    responses(
        (status = 200, description = "Page of cars with model, make, body style and color", body = ApiResponse),
        (status = 400, description = "Malformed query params", body = ApiResponse)
    )
)]
pub async fn list_cars_handler(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let page = state.catalog.list_cars(params.paging()).await?;
    respond(StatusCode::OK, &page)
}

#[utoipa::path(
    get,
    path = "/cars/{id}",
    tag = "cars",
    params(("id" = i64, Path, description = "Car id")),
    responses(
        (status = 200, description = "The car", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse)
    )
)]
pub async fn get_car_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    respond(StatusCode::OK, &state.catalog.get_car(id).await?)
}

#[utoipa::path(
    post,
    path = "/cars",
    tag = "cars",
    request_body = CarInput,
    responses(
        (status = 201, description = "Created and indexed", body = ApiResponse),
        (status = 400, description = "Missing field or bad year", body = ApiResponse),
        (status = 422, description = "Unknown model or color not offered by the model", body = ApiResponse)
    )
)]
pub async fn create_car_handler(
    State(state): State<AppState>,
    request: Result<Json<CarInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = body(request, EXPECTED_BODY)?;
    let car = state.catalog.create_car(&input).await?;
    respond(StatusCode::CREATED, &car)
}

#[utoipa::path(
    put,
    path = "/cars/{id}",
    tag = "cars",
    params(("id" = i64, Path, description = "Car id")),
    request_body = CarInput,
    responses(
        (status = 200, description = "Updated and reindexed", body = ApiResponse),
        (status = 400, description = "Missing field or bad year", body = ApiResponse),
        (status = 422, description = "Unknown car, model or unavailable color", body = ApiResponse)
    )
)]
pub async fn update_car_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<CarInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let input = body(request, EXPECTED_BODY)?;
    let car = state.catalog.update_car(id, &input).await?;
    respond(StatusCode::OK, &car)
}

#[utoipa::path(
    delete,
    path = "/cars/{id}",
    tag = "cars",
    params(("id" = i64, Path, description = "Car id")),
    responses(
        (status = 200, description = "Deleted from the store and the index", body = ApiResponse),
        (status = 422, description = "Unknown car", body = ApiResponse)
    )
)]
pub async fn delete_car_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    deleted(state.catalog.delete_car(id).await?)
}

use crate::domain::Paging;
use crate::search::service::{search_by_fields, search_by_term};
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{query, respond};
use crate::transport::http::types::{
    ApiResponse, AppState, CatalogSearchParams, FieldSearchParams, TermSearchParams,
};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;

#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    params(TermSearchParams),
    responses(
        (status = 200, description = "Ranked matches from the search index; empty on index failure", body = ApiResponse),
        (status = 400, description = "Malformed query params", body = ApiResponse)
    )
)]
pub async fn term_search_handler(
    State(state): State<AppState>,
    params: Result<Query<TermSearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let paging = Paging::from_optional(params.offset, params.limit);
    let term = params.term.as_deref().unwrap_or("");
    let page = search_by_term(state.index.as_ref(), term, paging).await;
    respond(StatusCode::OK, &page)
}

#[utoipa::path(
    get,
    path = "/search/cars",
    tag = "search",
    params(FieldSearchParams),
    responses(
        (status = 200, description = "Cars matching any of the given fields; empty on index failure", body = ApiResponse),
        (status = 400, description = "Malformed query params", body = ApiResponse)
    )
)]
pub async fn field_search_handler(
    State(state): State<AppState>,
    params: Result<Query<FieldSearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let page = search_by_fields(state.index.as_ref(), &params.terms(), params.paging()).await;
    respond(StatusCode::OK, &page)
}

#[utoipa::path(
    get,
    path = "/search/catalog",
    tag = "search",
    params(CatalogSearchParams),
    responses(
        (status = 200, description = "Cars whose fields contain every given substring", body = ApiResponse),
        (status = 400, description = "Malformed query params", body = ApiResponse)
    )
)]
pub async fn catalog_search_handler(
    State(state): State<AppState>,
    params: Result<Query<CatalogSearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let page = state
        .catalog
        .search_catalog(&params.filter(), params.paging())
        .await?;
    respond(StatusCode::OK, &page)
}

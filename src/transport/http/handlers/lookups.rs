//! Makes, colors and body styles share one set of handlers, stamped out per
//! route prefix so each gets its own OpenAPI operations.

use crate::app::LookupInput;
use crate::domain::LookupKind;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{body, deleted, parse_id, query, respond};
use crate::transport::http::types::{ApiResponse, AppState, PageParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

const EXPECTED_BODY: &str = "{\"name\": \"...\"}";

async fn list(
    state: &AppState,
    kind: LookupKind,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let page = state.catalog.list_lookups(kind, params.paging()).await?;
    respond(StatusCode::OK, &page)
}

async fn get_one(state: &AppState, kind: LookupKind, id: &str) -> Result<Response, ApiError> {
    let id = parse_id(id)?;
    let entity = state.catalog.get_lookup(kind, id).await?;
    respond(StatusCode::OK, &entity)
}

async fn create(
    state: &AppState,
    kind: LookupKind,
    request: Result<Json<LookupInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = body(request, EXPECTED_BODY)?;
    let created = state.catalog.create_lookup(kind, &input).await?;
    respond(StatusCode::CREATED, &created)
}

async fn update(
    state: &AppState,
    kind: LookupKind,
    id: &str,
    request: Result<Json<LookupInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(id)?;
    let input = body(request, EXPECTED_BODY)?;
    let updated = state.catalog.update_lookup(kind, id, &input).await?;
    respond(StatusCode::OK, &updated)
}

async fn remove(state: &AppState, kind: LookupKind, id: &str) -> Result<Response, ApiError> {
    let id = parse_id(id)?;
    deleted(state.catalog.delete_lookup(kind, id).await?)
}

macro_rules! lookup_handlers {
    ($module:ident, $kind:expr, $collection:tt, $item:tt, $tag:tt) => {
        pub mod $module {
            use super::*;

            #[utoipa::path(
                get,
                path = $collection,
                tag = $tag,
                operation_id = concat!("list_", stringify!($module)),
                params(PageParams),
                responses(
                    (status = 200, description = "Page of entities: { total, results }", body = ApiResponse),
                    (status = 400, description = "Malformed query params", body = ApiResponse)
                )
            )]
            pub async fn list_handler(
                State(state): State<AppState>,
                params: Result<Query<PageParams>, QueryRejection>,
            ) -> Result<Response, ApiError> {
                list(&state, $kind, params).await
            }

            #[utoipa::path(
                get,
                path = $item,
                tag = $tag,
                operation_id = concat!("get_", stringify!($module)),
                params(("id" = i64, Path, description = "Entity id")),
                responses(
                    (status = 200, description = "The entity", body = ApiResponse),
                    (status = 400, description = "Bad id param", body = ApiResponse),
                    (status = 404, description = "Not found", body = ApiResponse)
                )
            )]
            pub async fn get_handler(
                State(state): State<AppState>,
                Path(id): Path<String>,
            ) -> Result<Response, ApiError> {
                get_one(&state, $kind, &id).await
            }

            #[utoipa::path(
                post,
                path = $collection,
                tag = $tag,
                operation_id = concat!("create_", stringify!($module)),
                request_body = LookupInput,
                responses(
                    (status = 201, description = "Created", body = ApiResponse),
                    (status = 400, description = "Missing name field", body = ApiResponse),
                    (status = 422, description = "Name already taken", body = ApiResponse)
                )
            )]
            pub async fn create_handler(
                State(state): State<AppState>,
                request: Result<Json<LookupInput>, JsonRejection>,
            ) -> Result<Response, ApiError> {
                create(&state, $kind, request).await
            }

            #[utoipa::path(
                put,
                path = $item,
                tag = $tag,
                operation_id = concat!("update_", stringify!($module)),
                params(("id" = i64, Path, description = "Entity id")),
                request_body = LookupInput,
                responses(
                    (status = 200, description = "Renamed; indexed cars pick up the new name", body = ApiResponse),
                    (status = 400, description = "Missing name field", body = ApiResponse),
                    (status = 422, description = "Unknown id or name already taken", body = ApiResponse)
                )
            )]
            pub async fn update_handler(
                State(state): State<AppState>,
                Path(id): Path<String>,
                request: Result<Json<LookupInput>, JsonRejection>,
            ) -> Result<Response, ApiError> {
                update(&state, $kind, &id, request).await
            }

            #[utoipa::path(
                delete,
                path = $item,
                tag = $tag,
                operation_id = concat!("delete_", stringify!($module)),
                params(("id" = i64, Path, description = "Entity id")),
                responses(
                    (status = 200, description = "Deleted", body = ApiResponse),
                    (status = 422, description = "Unknown id or still referenced", body = ApiResponse)
                )
            )]
            pub async fn delete_handler(
                State(state): State<AppState>,
                Path(id): Path<String>,
            ) -> Result<Response, ApiError> {
                remove(&state, $kind, &id).await
            }
        }
    };
}

lookup_handlers!(makes, LookupKind::Make, "/makes", "/makes/{id}", "makes");
lookup_handlers!(colors, LookupKind::Color, "/colors", "/colors/{id}", "colors");
lookup_handlers!(
    body_styles,
    LookupKind::BodyStyle,
    "/body-styles",
    "/body-styles/{id}",
    "body-styles"
);

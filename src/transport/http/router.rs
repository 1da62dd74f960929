use crate::app::{CarInput, LookupInput, ModelInput};
use crate::domain::{Car, CarModel, LookupEntity, Model};
use crate::sync::SyncStatsSnapshot;
use crate::transport::http::handlers::lookups::{body_styles, colors, makes};
use crate::transport::http::handlers::{cars, health, models, search};
use crate::transport::http::types::{ApiResponse, AppState, HealthStatus};
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        makes::list_handler,
        makes::get_handler,
        makes::create_handler,
        makes::update_handler,
        makes::delete_handler,
        colors::list_handler,
        colors::get_handler,
        colors::create_handler,
        colors::update_handler,
        colors::delete_handler,
        body_styles::list_handler,
        body_styles::get_handler,
        body_styles::create_handler,
        body_styles::update_handler,
        body_styles::delete_handler,
        models::list_models_handler,
        models::get_model_handler,
        models::create_model_handler,
        models::update_model_handler,
        models::delete_model_handler,
        cars::list_cars_handler,
        cars::get_car_handler,
        cars::create_car_handler,
        cars::update_car_handler,
        cars::delete_car_handler,
        search::term_search_handler,
        search::field_search_handler,
        search::catalog_search_handler
    ),
    components(schemas(
        ApiResponse,
        HealthStatus,
        SyncStatsSnapshot,
        LookupEntity,
        LookupInput,
        Model,
        ModelInput,
        Car,
        CarModel,
        CarInput
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/makes",
            get(makes::list_handler).post(makes::create_handler),
        )
        .route(
            "/makes/:id",
            get(makes::get_handler)
                .put(makes::update_handler)
                .delete(makes::delete_handler),
        )
        .route(
            "/colors",
            get(colors::list_handler).post(colors::create_handler),
        )
        .route(
            "/colors/:id",
            get(colors::get_handler)
                .put(colors::update_handler)
                .delete(colors::delete_handler),
        )
        .route(
            "/body-styles",
            get(body_styles::list_handler).post(body_styles::create_handler),
        )
        .route(
            "/body-styles/:id",
            get(body_styles::get_handler)
                .put(body_styles::update_handler)
                .delete(body_styles::delete_handler),
        )
        .route(
            "/models",
            get(models::list_models_handler).post(models::create_model_handler),
        )
        .route(
            "/models/:id",
            get(models::get_model_handler)
                .put(models::update_model_handler)
                .delete(models::delete_model_handler),
        )
        .route(
            "/cars",
            get(cars::list_cars_handler).post(cars::create_car_handler),
        )
        .route(
            "/cars/:id",
            get(cars::get_car_handler)
                .put(cars::update_car_handler)
                .delete(cars::delete_car_handler),
        )
        .route("/search", get(search::term_search_handler))
        .route("/search/cars", get(search::field_search_handler))
        .route("/search/catalog", get(search::catalog_search_handler))
        .with_state(app_state)
}

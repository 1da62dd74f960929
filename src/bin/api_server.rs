// src/bin/api_server.rs

use anyhow::Context;
use car_catalog::infra::logging;
use car_catalog::infra::retry::Backoff;
use car_catalog::search::{CarIndex, DisabledIndex, EsClient};
use car_catalog::storage::CatalogStore;
use car_catalog::sync::{Flattener, SyncHooks};
use car_catalog::transport;
use car_catalog::{CatalogService, Config};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init();

    // --- Relational store ---
    tracing::info!("connecting to postgres");
    let store = CatalogStore::connect(
        &config.database_url,
        config.db_max_connections,
        Backoff::DATABASE,
    )
    .await
    .context("postgres unavailable after retries")?;

    // --- Search index ---
    let index: Arc<dyn CarIndex> = match &config.es_url {
        Some(url) => {
            tracing::info!(%url, "connecting to elasticsearch");
            let client = EsClient::connect(url, config.es_timeout, Backoff::SEARCH_INDEX)
                .await
                .context("elasticsearch unavailable after retries")?;
            client
                .init_index()
                .await
                .context("failed to create the cars index")?;
            Arc::new(client)
        }
        None => {
            tracing::warn!("ES_URL not set, search index disabled");
            Arc::new(DisabledIndex)
        }
    };

    // --- Sync hooks and service ---
    let flattener = Flattener::new(Arc::new(store.clone()));
    let hooks = Arc::new(SyncHooks::new(index.clone(), flattener));
    let app_state = transport::http::AppState {
        catalog: CatalogService::new(store, hooks),
        index,
    };

    // --- API Server ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "api server listening, swagger ui at /swagger-ui");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

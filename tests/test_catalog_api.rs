//! End-to-end test through the HTTP API against a real Postgres.
//!
//! Skipped unless `CATALOG_TEST_DATABASE_URL` is set. The search index is the
//! in-memory one from `common`, so no cluster is needed.

mod common;

use car_catalog::infra::retry::Backoff;
use car_catalog::search::CarIndex;
use car_catalog::storage::CatalogStore;
use car_catalog::sync::{Flattener, SyncHooks};
use car_catalog::{transport, CatalogService};
use common::{FailingIndex, InMemoryIndex};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;

const QUICK: Backoff = Backoff {
    retries: 2,
    factor: 1.5,
    min_delay: Duration::from_millis(200),
    max_delay: Duration::from_secs(1),
};

struct Api {
    client: reqwest::Client,
    base_url: String,
}

impl Api {
    async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> Result<(u16, JsonValue), Box<dyn std::error::Error>> {
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json::<JsonValue>().await?))
    }

    async fn post(&self, path: &str, body: JsonValue) -> Result<(u16, JsonValue), Box<dyn std::error::Error>> {
        self.call(reqwest::Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: JsonValue) -> Result<(u16, JsonValue), Box<dyn std::error::Error>> {
        self.call(reqwest::Method::PUT, path, Some(body)).await
    }

    async fn get(&self, path: &str) -> Result<(u16, JsonValue), Box<dyn std::error::Error>> {
        self.call(reqwest::Method::GET, path, None).await
    }

    async fn delete(&self, path: &str) -> Result<(u16, JsonValue), Box<dyn std::error::Error>> {
        self.call(reqwest::Method::DELETE, path, None).await
    }
}

fn id_of(body: &JsonValue) -> i64 {
    body["data"]["id"].as_i64().expect("response carries data.id")
}

struct Harness {
    api: Api,
    hooks: Arc<SyncHooks>,
    server: tokio::task::JoinHandle<()>,
}

/// Serves the API on an ephemeral port over the given index.
async fn start(
    database_url: &str,
    index: Arc<dyn CarIndex>,
) -> Result<Harness, Box<dyn std::error::Error>> {
    let store = CatalogStore::connect(database_url, 2, QUICK).await?;
    let hooks = Arc::new(SyncHooks::new(
        index.clone(),
        Flattener::new(Arc::new(store.clone())),
    ));
    let state = transport::http::AppState {
        catalog: CatalogService::new(store, hooks.clone()),
        index,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = transport::http::create_router(state);
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let api = Api {
        client: reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?,
        base_url: format!("http://{}", addr),
    };
    Ok(Harness { api, hooks, server })
}

fn test_database_url() -> Option<String> {
    dotenv::dotenv().ok();
    let url = std::env::var("CATALOG_TEST_DATABASE_URL").ok();
    if url.is_none() {
        eprintln!("CATALOG_TEST_DATABASE_URL not set, skipping");
    }
    url
}

fn run_suffix() -> String {
    chrono::Utc::now().timestamp_micros().to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_catalog_api() -> Result<(), Box<dyn std::error::Error>> {
    let Some(database_url) = test_database_url() else {
        return Ok(());
    };

    let index = Arc::new(InMemoryIndex::new());
    let Harness { api, hooks, server } = start(&database_url, index.clone()).await?;

    // Unique per run so leftovers from earlier runs don't collide.
    let sfx = run_suffix();
    let make_name = format!("toyota{}", sfx);

    // --- lookups ---
    let (status, make) = api.post("/makes", json!({ "name": format!("Toyota{}", sfx) })).await?;
    assert_eq!(status, 201, "{}", make);
    assert_eq!(make["data"]["name"], json!(make_name));
    let make_id = id_of(&make);

    let (status, dup) = api.post("/makes", json!({ "name": make_name })).await?;
    assert_eq!(status, 422);
    assert_eq!(dup["success"], json!(false));

    let (status, _) = api.post("/makes", json!({})).await?;
    assert_eq!(status, 400);

    let (_, body_style) = api.post("/body-styles", json!({ "name": format!("sedan{}", sfx) })).await?;
    let body_style_id = id_of(&body_style);
    let (_, blue) = api.post("/colors", json!({ "name": format!("blue{}", sfx) })).await?;
    let blue_id = id_of(&blue);
    let (_, red) = api.post("/colors", json!({ "name": format!("red{}", sfx) })).await?;
    let red_id = id_of(&red);

    // --- models ---
    let (status, missing) = api
        .post("/models", json!({ "name": "x", "makeId": make_id, "colorIds": [] }))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(missing["error"], json!("Missing bodyStyleId field"));

    let (status, unknown_color) = api
        .post(
            "/models",
            json!({
                "name": format!("camry{}", sfx),
                "makeId": make_id,
                "bodyStyleId": body_style_id,
                "colorIds": [blue_id, i64::MAX]
            }),
        )
        .await?;
    assert_eq!(status, 422, "{}", unknown_color);

    let (status, model) = api
        .post(
            "/models",
            json!({
                "name": format!("camry{}", sfx),
                "makeId": make_id,
                "bodyStyleId": body_style_id,
                "colorIds": [blue_id]
            }),
        )
        .await?;
    assert_eq!(status, 201, "{}", model);
    let model_id = id_of(&model);
    assert_eq!(model["data"]["make"]["id"], json!(make_id));
    assert_eq!(model["data"]["availableColors"][0]["id"], json!(blue_id));

    // --- cars ---
    let (status, unavailable) = api
        .post("/cars", json!({ "modelId": model_id, "colorId": red_id, "year": 2020 }))
        .await?;
    assert_eq!(status, 422);
    assert_eq!(
        unavailable["error"],
        json!(format!(
            "Color with id {} is not available for model {}",
            red_id, model_id
        ))
    );

    let (status, bad_year) = api
        .post("/cars", json!({ "modelId": model_id, "colorId": blue_id, "year": "20" }))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(bad_year["error"], json!("Bad input for year field"));

    let (status, car) = api
        .post("/cars", json!({ "modelId": model_id, "colorId": blue_id, "year": "2020" }))
        .await?;
    assert_eq!(status, 201, "{}", car);
    let car_id = id_of(&car);
    assert_eq!(car["data"]["model"]["make"]["name"], json!(make_name));

    let doc = index.get(car_id).expect("car indexed after insert");
    assert_eq!(doc.make, make_name);
    assert_eq!(doc.make_id, make_id);
    assert_eq!(doc.color_id, blue_id);

    let (status, _) = api.get("/cars/abc").await?;
    assert_eq!(status, 400);
    let (status, _) = api.get(&format!("/cars/{}", i64::MAX)).await?;
    assert_eq!(status, 404);

    // --- index search ---
    let (status, found) = api.get("/search?term=toyota").await?;
    assert_eq!(status, 200);
    assert_eq!(found["data"]["total"], json!(1));
    assert_eq!(found["data"]["results"][0]["id"], json!(car_id));

    // --- rename propagation ---
    let lexus = format!("lexus{}", sfx);
    let (status, _) = api
        .put(&format!("/makes/{}", make_id), json!({ "name": lexus }))
        .await?;
    assert_eq!(status, 200);
    assert_eq!(index.get(car_id).unwrap().make, lexus);

    let (status, relational) = api
        .get(&format!("/search/catalog?make={}", lexus.to_uppercase()))
        .await?;
    assert_eq!(status, 200);
    assert_eq!(relational["data"]["total"], json!(1));

    // --- restricted delete ---
    let (status, _) = api.delete(&format!("/makes/{}", make_id)).await?;
    assert_eq!(status, 422);

    // --- cleanup (also exercises deletes) ---
    let (status, _) = api.delete(&format!("/cars/{}", car_id)).await?;
    assert_eq!(status, 200);
    assert!(index.get(car_id).is_none());
    let (status, _) = api.delete(&format!("/cars/{}", car_id)).await?;
    assert_eq!(status, 422);

    api.delete(&format!("/models/{}", model_id)).await?;
    api.delete(&format!("/makes/{}", make_id)).await?;
    api.delete(&format!("/body-styles/{}", body_style_id)).await?;
    api.delete(&format!("/colors/{}", blue_id)).await?;
    api.delete(&format!("/colors/{}", red_id)).await?;

    let (status, health) = api.get("/health").await?;
    assert_eq!(status, 200);
    assert_eq!(health["data"]["database"], json!("ok"));
    assert_eq!(hooks.stats().failed, 0);

    server.abort();
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rename_commits_while_index_is_down() -> Result<(), Box<dyn std::error::Error>> {
    let Some(database_url) = test_database_url() else {
        return Ok(());
    };

    let index = Arc::new(FailingIndex::default());
    let Harness { api, hooks, server } = start(&database_url, index.clone()).await?;
    let sfx = run_suffix();

    let (status, make) = api.post("/makes", json!({ "name": format!("saab{}", sfx) })).await?;
    assert_eq!(status, 201, "{}", make);
    let make_id = id_of(&make);

    let renamed = format!("scania{}", sfx);
    let (status, updated) = api
        .put(&format!("/makes/{}", make_id), json!({ "name": renamed }))
        .await?;
    assert_eq!(status, 200, "{}", updated);
    assert_eq!(updated["data"]["name"], json!(renamed));

    let (status, stored) = api.get(&format!("/makes/{}", make_id)).await?;
    assert_eq!(status, 200);
    assert_eq!(stored["data"]["name"], json!(renamed));

    assert_eq!(index.attempts(), 1);
    assert_eq!(hooks.stats().failed, 1);

    let (status, _) = api.delete(&format!("/makes/{}", make_id)).await?;
    assert_eq!(status, 200);

    server.abort();
    Ok(())
}

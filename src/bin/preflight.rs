use anyhow::Context;
use car_catalog::infra::logging;
use car_catalog::infra::retry::Backoff;
use car_catalog::search::{CarIndex, EsClient};
use car_catalog::storage::CatalogStore;
use car_catalog::sync::{Flattener, SyncHooks};
use car_catalog::{CatalogService, Config};
use std::sync::Arc;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--init-index] [--reindex]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           ES_URL (required for --init-index and --reindex), ES_TIMEOUT_SECS, DB_MAX_CONNECTIONS\n"
    );
    std::process::exit(2);
}

/// One attempt only; preflight reports instead of waiting.
const NO_RETRY: Backoff = Backoff {
    retries: 0,
    ..Backoff::DATABASE
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let init_index = args.iter().any(|a| a == "--init-index");
    let reindex = args.iter().any(|a| a == "--reindex");

    let config = Config::from_env()?;
    logging::init();

    println!("> Preflight:");
    println!("  PORT={}", config.port);
    println!("  DB_MAX_CONNECTIONS={}", config.db_max_connections);
    println!("  ES_URL={}", config.es_url.as_deref().unwrap_or("<unset>"));

    // Database reachability (also applies the schema).
    let store = CatalogStore::connect(&config.database_url, config.db_max_connections, NO_RETRY)
        .await
        .context("database is not reachable")?;
    store.ping().await?;
    println!("  Database reachable, schema applied.");

    let Some(es_url) = config.es_url.as_deref() else {
        if init_index || reindex {
            return Err(anyhow::anyhow!(
                "ES_URL is not set; --init-index and --reindex need a search index"
            ));
        }
        println!("  Search index disabled (ES_URL unset).");
        println!("> Preflight OK.");
        return Ok(());
    };

    let client = EsClient::connect(es_url, config.es_timeout, NO_RETRY)
        .await
        .context("search index is not reachable")?;
    println!("  Search index reachable at {}.", client.base_url());

    if client.exists().await? {
        println!("  Index 'cars' exists.");
    } else if init_index {
        println!("  Index missing -> creating with edge n-gram analyzer...");
        client.init_index().await?;
        if !client.exists().await? {
            return Err(anyhow::anyhow!("index still missing after create"));
        }
        println!("  Index created.");
    } else {
        return Err(anyhow::anyhow!(
            "Index 'cars' does not exist. Re-run with --init-index"
        ));
    }

    if reindex {
        println!("  Reindexing every car from the database...");
        let index: Arc<dyn CarIndex> = Arc::new(client);
        let flattener = Flattener::new(Arc::new(store.clone()));
        let hooks = Arc::new(SyncHooks::new(index, flattener));
        let report = CatalogService::new(store, hooks).reindex_all().await?;
        println!(
            "  Reindexed {} of {} cars ({} failed).",
            report.indexed, report.total, report.failed
        );
        if report.failed > 0 {
            return Err(anyhow::anyhow!("{} cars could not be indexed", report.failed));
        }
    }

    println!("> Preflight OK.");
    Ok(())
}

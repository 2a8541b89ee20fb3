// ./demo/src/main.rs
use std::env;
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use application::{ApplicationError, DocumentStore};
use domain::{Author, Document, SearchRequest};
use infrastructure::InMemoryDocumentRepository;

const DEFAULT_SEED_COUNT: usize = 10;
const DEFAULT_SEARCH_PREFIX: &str = "Title 1";

/// Settings read from the environment.
#[derive(Debug)]
struct DemoConfig {
    seed_count: usize,
    search_prefix: String,
}

impl DemoConfig {
    fn from_env() -> Self {
        let seed_count = match env::var("SEED_COUNT") {
            Ok(raw) => match usize::from_str(&raw) {
                Ok(count) => {
                    info!("Using seed count {} from environment variable SEED_COUNT.", count);
                    count
                }
                Err(_) => {
                    warn!(
                        "Invalid SEED_COUNT value '{}'. Using default {}.",
                        raw, DEFAULT_SEED_COUNT
                    );
                    DEFAULT_SEED_COUNT
                }
            },
            Err(_) => DEFAULT_SEED_COUNT,
        };

        let search_prefix = env::var("SEARCH_PREFIX")
            .ok()
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_PREFIX.to_string());

        Self {
            seed_count,
            search_prefix,
        }
    }
}

#[tokio::main]
async fn main() {
    // --- Logger Initialization ---
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
    info!("Logger initialized successfully.");

    let config = DemoConfig::from_env();

    // --- Dependency Injection ---
    let repository = Arc::new(InMemoryDocumentRepository::new());
    let store = DocumentStore::new(repository);
    info!("Document store initialized.");

    if let Err(e) = run(&store, &config).await {
        error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(store: &DocumentStore, config: &DemoConfig) -> Result<(), ApplicationError> {
    store.generate_random(config.seed_count).await?;

    let saved = store
        .save(Document::new(
            "Getting started",
            "A hand-written document saved through the store.",
            Author::new("author-demo", "Demo Author"),
        ))
        .await?;
    if let Some(id) = saved.assigned_id() {
        let found = store.find_by_id(id.as_str()).await?;
        info!(doc_id = %id, found = found.is_some(), "Looked up saved document");
    }

    let request = SearchRequest::new().with_title_prefixes([config.search_prefix.as_str()]);
    let hits = store.search(&request).await?;
    let total = store.count().await?;
    info!(
        prefix = %config.search_prefix,
        hits = hits.len(),
        total,
        "Demo search finished"
    );

    store.dump_all(&mut io::stdout()).await?;
    Ok(())
}

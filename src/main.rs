use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use caresnap::api::{app_router, ApiContext};
use caresnap::assistant::{Assistant, DEFAULT_GENERATE_TIMEOUT_SECS};
use caresnap::config::{self, Config};
use caresnap::consent::ConsentStore;
use caresnap::snapshot::{SnapshotBuilder, TableClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        version = config::APP_VERSION,
        source = %config.hospital_base_url,
        assistant = config.ollama_base_url.as_deref().unwrap_or("mock"),
        "{} starting",
        config::APP_NAME
    );

    let tables = TableClient::new(
        &config.hospital_base_url,
        config.hospital_bearer_token.clone(),
        config.fetch_timeout_secs,
    );
    let assistant = Assistant::from_config(
        config.ollama_base_url.as_deref(),
        &config.ollama_model,
        DEFAULT_GENERATE_TIMEOUT_SECS,
    );
    let ctx = ApiContext::new(
        Arc::new(ConsentStore::new()),
        Arc::new(SnapshotBuilder::new(tables)),
        Arc::new(assistant),
    );

    let app = app_router(ctx, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .await
        .expect("error while running caresnap");
}

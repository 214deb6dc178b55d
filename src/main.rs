use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use page_digest::{
    api::create_router,
    config::Config,
    llm::build_provider,
    logging,
    store::{CaptureStore, FileStore, MemoryStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;
    logging::init();

    let server_addr = config.server_addr;
    info!(
        provider = ?config.provider.kind,
        model = %config.provider.model,
        credential = if config.provider.api_key.is_some() { "configured" } else { "missing" },
        "starting page-digest"
    );

    let store: Arc<dyn CaptureStore> = match &config.data_file {
        Some(path) => Arc::new(FileStore::open(path).await?),
        None => Arc::new(MemoryStore::new()),
    };
    let provider = build_provider(&config.provider)?;

    // Create application state
    let app_state = AppState::new(config, store, provider);

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener
    let listener = TcpListener::bind(server_addr).await?;

    // Start the server
    info!("listening on {}", server_addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

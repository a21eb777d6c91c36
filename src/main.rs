use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use quill::auth::session::SqliteSessionStore;
use quill::auth::SqliteIdentityGateway;
use quill::config::{Cli, Config};
use quill::db;
use quill::routes;
use quill::state::AppState;
use quill::store::SqlitePostStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database; any failure here is fatal before we serve
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations(&pool)?;

    // Wire up the collaborators once; handlers get them through AppState
    let state = AppState {
        posts: Arc::new(SqlitePostStore::new(pool.clone())),
        identity: Arc::new(SqliteIdentityGateway::new(pool.clone())),
        sessions: Arc::new(SqliteSessionStore::new(pool)),
        config: config.clone(),
    };

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! GenZen server - Main entry point
//!
//! Wires the database, the playback and community engines, and the external
//! collaborators into the HTTP router and serves it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genzen_server::api::{self, AppContext};
use genzen_server::auth::HttpIdentityVerifier;
use genzen_server::community::CommunityEngine;
use genzen_server::config::Config;
use genzen_server::db;
use genzen_server::generate::OpenAiGenerator;
use genzen_server::playback::{ClockBackend, DbPlayTracker, PlayerEngine};
use genzen_server::state::SharedState;
use genzen_server::synth::LocalSynthesizer;

/// Command-line arguments for genzen-server
#[derive(Parser, Debug)]
#[command(name = "genzen-server")]
#[command(about = "Meditation generation and community service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "GENZEN_PORT")]
    port: Option<u16>,

    /// SQLite database path
    #[arg(short, long, env = "GENZEN_DB")]
    db_path: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(short, long, env = "GENZEN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genzen_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }

    info!("Starting GenZen server on port {}", config.port);
    info!("Database: {}", config.db_path.display());

    let pool = db::init::init_database(&config.db_path)
        .await
        .context("Failed to initialize database")?;

    let state = Arc::new(SharedState::new());

    let community = Arc::new(CommunityEngine::new(pool.clone(), Arc::clone(&state)));

    let player = Arc::new(PlayerEngine::new(
        Arc::new(LocalSynthesizer::new()),
        Arc::new(ClockBackend),
        Arc::new(DbPlayTracker::new(pool.clone())),
        Arc::clone(&state),
    ));
    player.start();
    info!("Player engine started");

    let generator = Arc::new(
        OpenAiGenerator::new(&config.generation)
            .context("Failed to initialize script generator")?,
    );
    let verifier = Arc::new(
        HttpIdentityVerifier::new(config.auth.verify_url.clone())
            .context("Failed to initialize identity verifier")?,
    );

    let ctx = AppContext {
        db: pool,
        state,
        community,
        player,
        generator,
        verifier,
        auth_provider: config.auth.provider.clone(),
    };

    let app = api::create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

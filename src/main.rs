//! # Statute Search Server Main Driver
//!
//! ## Purpose
//! Main entry point for the statute retrieval server. Orchestrates
//! initialization of all system components and starts the web server for
//! handling search requests. Also drives the offline index build.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Offline mode: build the corpus artifact from the statute table and exit
//! 4. Service mode: load the corpus artifact, initialize the engine
//! 5. Start web API server
//! 6. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use statute_semantic_search::{
    api::ApiServer,
    builder::IndexBuilder,
    config::Config,
    errors::{Result, SearchError},
    search::SearchEngine,
    AppState, HttpEmbeddingProvider,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("statute-search-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Legal Search Team")
        .about("Semantic retrieval engine mapping incident narratives to ranked statute sections")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("build-index")
                .long("build-index")
                .help("Build the corpus artifact from the statute table and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").expect("has default");
    let mut config = Config::from_file(config_path)?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);

    init_logging(&config)?;

    info!(
        "Starting statute search engine v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Configuration loaded from: {}", config_path);

    let provider = Arc::new(HttpEmbeddingProvider::new(&config.embedding)?);

    // Offline build mode
    if matches.get_flag("build-index") {
        return build_index(&config, provider).await;
    }

    // Initialize the retrieval engine
    let engine = Arc::new(SearchEngine::new(config.clone(), provider));
    let artifact_path = &config.corpus.artifact_path;
    if artifact_path.exists() {
        // A present-but-invalid artifact is fatal; a missing one starts the
        // service not-ready.
        engine.load_artifact(artifact_path)?;
        info!("Corpus artifact loaded from {:?}", artifact_path);
    } else {
        warn!(
            "Corpus artifact not found at {:?}; serving not-ready until /reload",
            artifact_path
        );
    }

    let app_state = AppState {
        config: config.clone(),
        engine,
    };

    // Start the API server
    let server = ApiServer::new(app_state);

    info!(
        "Statute search engine started on {}:{}",
        config.server.host, config.server.port
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        res = server.run() => {
            if let Err(e) = res {
                error!("Server error: {}", e);
            }
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Statute search engine shut down");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let _: tracing::Level = config
        .logging
        .level
        .parse()
        .map_err(|_| SearchError::Config {
            message: format!("Invalid log level: {}", config.logging.level),
        })?;

    // RUST_LOG takes precedence over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(fmt_layer.json().with_filter(filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    }

    info!("Logging initialized with level: {}", config.logging.level);
    Ok(())
}

/// Run the offline index builder and persist the artifact
async fn build_index(
    config: &Arc<Config>,
    provider: Arc<HttpEmbeddingProvider>,
) -> Result<()> {
    info!(
        "Building corpus artifact from {:?}",
        config.builder.statute_table_path
    );

    let builder = IndexBuilder::new(config, provider);
    let artifact = builder
        .build_from_table(&config.builder.statute_table_path)
        .await?;
    artifact.save(&config.corpus.artifact_path)?;

    info!(
        "Corpus artifact written to {:?} ({} sections)",
        config.corpus.artifact_path,
        artifact.len()
    );
    Ok(())
}

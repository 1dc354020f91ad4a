//! PDF Merge Web - HTTP service that merges PDFs fetched from URLs.

mod helpers;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::{get, post},
};
use clap::Parser;
use pdf_merge_core::ServiceConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "pdf-merge-web")]
#[command(author, version, about = "PDF Merge Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Base URL prepended to published artifact paths
    #[arg(long, env = "PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Root directory for published files (served under /storage)
    #[arg(long, env = "STORAGE_ROOT")]
    storage_root: Option<String>,

    /// Directory for private per-request staging areas
    #[arg(long, env = "STAGING_ROOT")]
    staging_root: Option<String>,

    /// Configuration file (TOML); defaults to ./config.toml when present
    #[arg(long)]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = match args.config.as_deref() {
        Some(path) => ServiceConfig::from_file(path).context("Failed to load config file")?,
        None => ServiceConfig::load(),
    };
    if let Some(base_url) = args.public_base_url {
        config.public_base_url = base_url;
    }
    if let Some(root) = args.storage_root {
        config.storage_root = root.into();
    }
    if let Some(root) = args.staging_root {
        config.staging_root = root.into();
    }

    // ServeDir needs the storage root to exist before the first request.
    std::fs::create_dir_all(&config.storage_root)
        .with_context(|| format!("Failed to create {}", config.storage_root.display()))?;

    let state = Arc::new(AppState::new(&config));

    // Build router
    let app = Router::new()
        .route("/merge-pdfs", post(routes::merge_pdfs))
        .route("/healthz", get(routes::healthz))
        // Published artifacts; they are never rewritten, so clients may
        // cache them indefinitely
        .nest_service(
            "/storage",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=31536000, immutable"),
                ))
                .service(ServeDir::new(&state.storage_root)),
        )
        // Middleware
        .layer(DefaultBodyLimit::max(1024 * 1024)) // JSON bodies only
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

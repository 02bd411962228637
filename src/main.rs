use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use heritage_brander::config::Config;
use heritage_brander::error::BrandingError;
use heritage_brander::logging::{init_subscriber, LogFormat};
use heritage_brander::pipeline::BrandingPipeline;
use heritage_brander::server;
use heritage_brander::storage::{ObjectStorage, S3ObjectStorage};
use heritage_brander::watermark::HttpLogoFetcher;
use tokio::net::TcpListener;

/// Heritage Brander - stamps the archive logo onto newly uploaded images
#[derive(Parser, Debug)]
#[command(name = "heritage-brander")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file (environment variables otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_subscriber(args.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {e}"))?;

    let config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    tracing::info!(
        config_source = %args
            .config
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string()),
        target_bucket = %config.branding.target_bucket,
        logo_configured = config.branding.logo_url().is_some(),
        storage_configured = config.storage.is_complete(),
        "Configuration loaded successfully"
    );

    if config.branding.logo_url().is_none() {
        tracing::warn!("BRANDING_LOGO_URL is not set; actionable events will fail");
    }

    if args.test {
        println!("Configuration is valid");
        return Ok(());
    }

    let storage: Option<Arc<dyn ObjectStorage>> = if config.storage.is_complete() {
        let storage = S3ObjectStorage::from_config(&config.storage)
            .await
            .context("Failed to create storage client")?;
        Some(Arc::new(storage))
    } else {
        tracing::warn!(
            missing = %config.storage.missing_fields().join(", "),
            "Storage is not configured; actionable events will fail"
        );
        None
    };

    let logo_source = HttpLogoFetcher::new(&config.fetch)
        .map_err(BrandingError::from)
        .context("Failed to create logo fetcher")?;

    let listen_addr = config.server.listen_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;

    let pipeline = Arc::new(BrandingPipeline::new(
        Arc::new(config),
        storage,
        Arc::new(logo_source),
    ));

    tracing::info!(address = %listen_addr, "Starting Heritage Brander");

    server::serve(listener, pipeline, server::shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

use anyhow::Context;
use clap::Parser;
use ft_core::{ArticleFilter, ArticleStorage, Result};
use ft_scrapers::{handle_command, init_logging, ScraperArgs, ScraperConfig, ScraperManager};
use ft_storage::{create_storage, BackendConfig, InMemoryStorage, StorageKind};
use ft_web::{create_app, serve, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const STORAGE_CHECK_RETRIES: u32 = 3;
const STORAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(author, version, about = "Football news scraper and API", long_about = None)]
pub struct Cli {
    /// Storage backend: sqlite or memory
    #[arg(long, env = "FT_STORAGE", default_value = "sqlite")]
    storage: StorageKind,
    /// SQLite database file
    #[arg(long, env = "FT_DATABASE", default_value = "articles.db")]
    database: PathBuf,
    /// Fall back to in-memory storage if the configured store cannot be opened
    #[arg(long, env = "FT_ALLOW_DEGRADED")]
    allow_degraded: bool,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "FT_LOG", default_value = "info")]
    log_level: String,
    /// Pause between article fetches within one batch
    #[arg(long, env = "FT_REQUEST_DELAY_MS", default_value_t = 2000)]
    request_delay_ms: u64,
    /// Per-request timeout
    #[arg(long, env = "FT_REQUEST_TIMEOUT_SECS", default_value_t = 15)]
    request_timeout_secs: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "FT_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,
    },
    /// Scrape sources from the command line
    Scrape(ScraperArgs),
}

async fn check_storage(storage: &Arc<dyn ArticleStorage>) -> Result<()> {
    let total = storage.count_articles(&ArticleFilter::default()).await?;
    info!("🏦 Storage backend ready (using {}, {} articles)", storage.name(), total);
    Ok(())
}

async fn check_storage_with_retry(storage: &Arc<dyn ArticleStorage>, max_retries: u32, timeout: Duration) -> Result<()> {
    let mut retries = 0;
    let mut last_error = None;

    while retries < max_retries {
        match tokio::time::timeout(timeout, check_storage(storage)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => last_error = Some(e),
            Err(elapsed) => {
                last_error = Some(ft_core::Error::Storage(format!("Storage health check timed out: {}", elapsed)));
            }
        }
        retries += 1;
        if retries < max_retries {
            info!("Storage health check failed, retrying {}/{}...", retries, max_retries);
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| ft_core::Error::Storage("Storage health check failed after all retries".to_string())))
}

async fn open_storage(cli: &Cli) -> Result<Arc<dyn ArticleStorage>> {
    let config = BackendConfig {
        kind: cli.storage,
        path: Some(cli.database.clone()),
    };
    let storage = create_storage(&config).await?;
    check_storage_with_retry(&storage, STORAGE_CHECK_RETRIES, STORAGE_CHECK_TIMEOUT).await?;
    Ok(storage)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let storage = match open_storage(&cli).await {
        Ok(storage) => storage,
        Err(e) if cli.allow_degraded => {
            warn!(error = %e, "Storage unavailable, continuing with in-memory storage");
            Arc::new(InMemoryStorage::new())
        }
        Err(e) => {
            return Err(e).context(format!(
                "Failed to open {} storage ({})",
                cli.storage,
                cli.storage.error_hint()
            ))
        }
    };

    let config = ScraperConfig::default()
        .with_request_delay(Duration::from_millis(cli.request_delay_ms))
        .with_request_timeout(Duration::from_secs(cli.request_timeout_secs));
    let manager = ScraperManager::from_config(storage, config)?;
    info!(
        "🦗 Scrapers initialized: {}",
        manager
            .registry()
            .sources()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    match cli.command {
        Commands::Serve { host, port } => {
            let app = create_app(AppState::new(Arc::new(manager)));
            serve(app, &host, port).await?;
        }
        Commands::Scrape(args) => handle_command(args, &manager).await?,
    }

    Ok(())
}

//! Scrubber: PII redaction server for text and JSON documents.

use std::path::PathBuf;
use std::sync::Arc;

use scrubber_core::{ScrubberConfig, StoreBackend};
use scrubber_server::{build_router, AppState};
use scrubber_store::{Cache, MemoryCache, SqliteCache};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn resolve_data_dir() -> PathBuf {
    std::env::var("SCRUBBER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                println!("Scrubber: PII redaction server");
                println!();
                println!("Usage: scrubber [command]");
                println!();
                println!("Commands:");
                println!("  (none)     Start the server");
                println!("  help       Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT                        Listen port (default 8080)");
                println!("  SCRUBBER_DATA_DIR           Data directory (default ./data)");
                println!("  SCRUBBER_STORE              sqlite | memory (default sqlite)");
                println!("  SCRUBBER_MIN_SCORE          Finding score threshold (default 0.0)");
                println!("  SCRUBBER_SCAN_TIMEOUT_SECS  Document scan deadline, 0 disables (default 30)");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'scrubber help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = ScrubberConfig::from_env(&data_dir)?;
    let port = config.port;

    let cache: Arc<dyn Cache> = match config.store_backend {
        StoreBackend::Sqlite => {
            let sqlite = SqliteCache::open(&config.data_paths.store)
                .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
            info!("Store file: {}", sqlite.db_path().display());
            Arc::new(sqlite)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; recognizers and templates are not persisted");
            Arc::new(MemoryCache::new())
        }
    };

    info!("Store backend: {}", cache.name());

    let state = Arc::new(AppState::new(config, cache));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Scrubber server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

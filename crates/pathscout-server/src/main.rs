//! Pathscout server entry point.
//!
//! Wires together the storage layer, the settings store, the dispatcher,
//! and the TCP listener, then runs the Tokio async runtime until Ctrl-C.
//!
//! ```text
//! main()
//!  └─ load_config()        -- TOML file, CLI/env overrides on top
//!  └─ initial scan+save    -- so the first FILTER/SORT has a document
//!  └─ Server::bind().run() -- accept loop, one task per connection
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pathscout_server::application::{Dispatcher, SettingsStore};
use pathscout_server::infrastructure::network::Server;
use pathscout_server::infrastructure::scanner;
use pathscout_server::infrastructure::storage::{load_config, AuditLog, InventoryStore, ServerConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Pathscout server.
///
/// Maintains an inventory of the executables on the host's search path and
/// serves it to clients over the masked TCP protocol.
#[derive(Debug, Parser)]
#[command(
    name = "pathscout-server",
    about = "Serve the host's executable inventory over the Pathscout protocol",
    version
)]
struct Cli {
    /// Path of the TOML configuration file. A missing file is not an error;
    /// defaults apply.
    #[arg(long, default_value = "pathscout.toml", env = "PATHSCOUT_CONFIG")]
    config: PathBuf,

    /// Overrides the configured bind address.
    #[arg(long, env = "PATHSCOUT_BIND")]
    bind: Option<String>,

    /// Overrides the configured TCP port.
    #[arg(long, env = "PATHSCOUT_PORT")]
    port: Option<u16>,

    /// Overrides the configured single-byte mask key. Clients must use the
    /// same value.
    #[arg(long, env = "PATHSCOUT_MASK_KEY")]
    mask_key: Option<u8>,
}

impl Cli {
    /// Applies the CLI/env overrides on top of the file-based config.
    fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(bind) = &self.bind {
            config.network.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(mask_key) = self.mask_key {
            config.protocol.mask_key = mask_key;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);

    // Level comes from RUST_LOG when set, else from the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!("Pathscout server starting");

    let audit = Arc::new(AuditLog::new(config.storage.audit_log.clone()));
    let store = Arc::new(InventoryStore::new(config.storage.inventory_file.clone()));
    let settings = Arc::new(SettingsStore::new(Arc::clone(&audit)));
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store), settings));

    // Scan and persist once before accepting connections, so FILTER and
    // SORT have a document to read even if no client ever sends UPDATE.
    let path_value = std::env::var("PATH").unwrap_or_default();
    let inventory = scanner::scan(&scanner::search_path_dirs(&path_value));
    let bytes = store
        .save(&inventory)
        .await
        .context("failed to persist initial inventory")?;
    info!(
        directories = inventory.directories.len(),
        bytes = bytes.len(),
        "initial search-path inventory saved"
    );

    let addr = config.listen_addr().context("invalid listen address")?;
    let server = Server::bind(addr, dispatcher, config.protocol.mask_key).await?;

    // Shutdown flag shared with the accept loop; Ctrl-C clears it.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                error!("failed to listen for shutdown signal: {e}");
            }
        }
    });

    server.run(running).await;

    info!("Pathscout server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

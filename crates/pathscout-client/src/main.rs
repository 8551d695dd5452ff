//! Pathscout client entry point.
//!
//! Connects to a Pathscout server, prints the greeting, then runs an
//! interactive shell: each line typed is sent as one command packet and the
//! response is printed, pretty-printed when it parses as JSON.
//!
//! # Usage
//!
//! ```text
//! pathscout-client [OPTIONS]
//!
//! Options:
//!   --host     <HOST>  Server IP address [default: 127.0.0.1]
//!   --port     <PORT>  Server TCP port [default: 9090]
//!   --mask-key <KEY>   Single-byte mask key, must match the server [default: 123]
//! ```

use std::io::Write as _;
use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use pathscout_client::ServerConnection;
use pathscout_core::DEFAULT_MASK_KEY;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Interactive Pathscout client.
#[derive(Debug, Parser)]
#[command(
    name = "pathscout-client",
    about = "Query a Pathscout server's executable inventory",
    version
)]
struct Cli {
    /// IP address of the Pathscout server.
    #[arg(long, default_value = "127.0.0.1", env = "PATHSCOUT_HOST")]
    host: String,

    /// TCP port of the Pathscout server.
    #[arg(long, default_value_t = 9090, env = "PATHSCOUT_PORT")]
    port: u16,

    /// Single-byte mask key; must match the server's configured key.
    #[arg(long, default_value_t = DEFAULT_MASK_KEY, env = "PATHSCOUT_MASK_KEY")]
    mask_key: u8,
}

impl Cli {
    /// Combines `--host` and `--port` into a socket address.
    ///
    /// # Errors
    ///
    /// Returns an error when `--host` is not a valid IP address.
    fn server_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid server address: '{}:{}'", self.host, self.port))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep the interactive output clean: only warnings and errors unless
    // RUST_LOG asks for more.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let addr = cli.server_addr()?;

    println!("Connecting to {addr}...");
    let (mut connection, greeting) = ServerConnection::connect(addr, cli.mask_key).await?;
    println!("Server: {}", String::from_utf8_lossy(&greeting));

    println!(
        "Commands:\n\
         \x20 UPDATE               - rescan the search path\n\
         \x20 SET VAR=VALUE        - store a setting\n\
         \x20 FILTER name=python   - filter executables by name\n\
         \x20 SORT name            - sort executables by name\n\
         \x20 EXIT                 - quit\n"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command.eq_ignore_ascii_case("EXIT") {
            println!("Client closed.");
            break;
        }

        match connection.request(command).await? {
            Some(payload) => print_response(&payload),
            None => {
                println!("Server closed the connection.");
                break;
            }
        }
    }

    Ok(())
}

/// Prints a response payload: pretty JSON when it parses, plain text
/// otherwise.
fn print_response(payload: &[u8]) {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(payload) {
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            println!("{pretty}");
            return;
        }
    }
    println!("Server: {}", String::from_utf8_lossy(payload));
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Polyglot file-based API router.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ router ──▶ routing (route table, matcher)
//!                                        │
//!                                        ├──▶ handler (method dispatch)
//!                                        ├──▶ envelope (canonical request)
//!                                        ├──▶ resilience (timeout + retry)
//!                                        │       └──▶ bridge ──▶ native closure
//!                                        │                  └──▶ node / tsx / python3 / ruby
//!                                        └──▶ envelope (normalize {status, body})
//!     Client Response
//!     ◀────────────── http::server ◀── ResponseEnvelope
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use polyglot_router::config::{load_config, RouterConfig};
use polyglot_router::lifecycle::{signals, startup, Shutdown};
use polyglot_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "polyglot-router")]
#[command(about = "File-based API router for Rust, JavaScript, TypeScript, Python and Ruby handlers", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Routes directory, overriding `routes.directory`.
    #[arg(long, global = true)]
    api_dir: Option<PathBuf>,

    /// Bind address, overriding `listener.bind_address`.
    #[arg(short, long, global = true)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve HTTP requests (default)
    Serve,
    /// Print the resolved route table and exit
    Routes,
}

impl Cli {
    fn load_config(&self) -> Result<RouterConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RouterConfig::default(),
        };
        if let Some(dir) = &self.api_dir {
            config.routes.directory = dir.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Routes => print_routes(&config),
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: RouterConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "polyglot-router starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes_directory = %config.routes.directory.display(),
        prefix = %config.routes.prefix,
        timeout_ms = config.invocation.timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());
    startup::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(config: &RouterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let table = startup::build_routes(&config.routes)?;
    for route in table.routes() {
        println!(
            "{:<32} {:<12} {}",
            route.pattern().to_string(),
            route.module().language().as_str(),
            route.module().methods()
        );
    }
    Ok(())
}

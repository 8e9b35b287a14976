use anyhow::{Context, Result};
use axum::Router;
use books::infra::storage::InMemoryLibrary;
use books::BooksModule;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Serves the demo books catalogue as a JSON:API endpoint.
#[derive(Parser)]
#[command(name = "jsonapi-server", version, about = "JSON:API Server - serves the books catalogue over JSON:API")]
struct Cli {
    /// YAML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overriding server.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Raise console verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration and print it
    Check,
}

impl Cli {
    fn runtime_args(&self) -> CliArgs {
        CliArgs {
            config: self.config.as_ref().map(|p| p.display().to_string()),
            port: self.port,
            print_config: self.print_config,
            verbose: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = bootstrap(&cli)?;

    if cli.print_config {
        // stdout must carry only the YAML, so this runs before logging starts
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging, Path::new(&config.server.home_dir));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

/// Layered config plus command-line overrides.
fn bootstrap(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&cli.runtime_args());
    Ok(config)
}

fn build_router(config: &AppConfig, addr: SocketAddr) -> Router {
    let module = BooksModule::new(Arc::new(InMemoryLibrary::seeded()), format!("http://{addr}"));
    let router = module.router(config.jsonapi_or_default()).layer(TraceLayer::new_for_http());

    match config.server.timeout_sec {
        0 => router,
        secs => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;
    let addr = config.server.bind_addr()?;
    let router = build_router(&config, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "JSON:API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")?;

    tracing::info!("JSON:API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = tokio::signal::ctrl_c() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    let _ = tokio::signal::ctrl_c().await;

    tracing::info!("Shutdown requested");
}

fn check_config(config: &AppConfig) -> Result<()> {
    config.validate()?;
    tracing::info!(home_dir = %config.server.home_dir, "Configuration is valid");
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

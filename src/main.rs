//! Invocation Router local runner
//!
//! Runs the request-handling runtime outside the managed platform.
//!
//! # Architecture Overview
//!
//! ```text
//!     invoke: payload file/stdin ──┐
//!                                  ▼
//!                            ┌───────────┐    ┌────────┐    ┌────────────┐
//!                            │   event   │───▶│ router │───▶│  binding   │
//!                            │  adapter  │    └────────┘    └─────┬──────┘
//!                            └───────────┘                        ▼
//!     serve: HTTP request ──▶ (single)                     ┌────────────┐
//!                                                          │ dispatcher │
//!                                                          │ + deadline │
//!                                                          └─────┬──────┘
//!                                                                ▼
//!     output envelope / HTTP response ◀──── render ◀──── access log
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::net::TcpListener;

use invocation_router::binding::TypeCoercion;
use invocation_router::config::load_config;
use invocation_router::http::HttpServer;
use invocation_router::lifecycle::spawn_signal_listener;
use invocation_router::observability::init_logging;
use invocation_router::runtime::diagnostic_routes;
use invocation_router::{App, AppBuilder, InvokeError, RuntimeConfig};

#[derive(Parser)]
#[command(name = "invocation-router")]
#[command(version, about = "Local runner for the invocation router", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one invocation payload and print the output envelope
    Invoke {
        /// Payload file; stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Serve the routes over HTTP
    Serve {
        /// Overrides server.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability);

    // One invocation at a time; batches interleave on this one thread.
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(async move {
        let app = build_app(&config)?;
        let code = match cli.command {
            Commands::Invoke { event } => invoke(&app, event).await?,
            Commands::Serve { bind } => {
                let app = Arc::new(app);
                serve(app.clone(), &config, bind).await?;
                app.close().await;
                return Ok(ExitCode::SUCCESS);
            }
        };
        app.close().await;
        Ok(code)
    })
}

fn build_app(config: &RuntimeConfig) -> Result<App, Box<dyn std::error::Error>> {
    let mut builder = AppBuilder::from_config(config).validator(Arc::new(TypeCoercion));
    for route in diagnostic_routes() {
        builder = builder.route(route)?;
    }
    Ok(builder.build())
}

async fn invoke(app: &App, event: Option<PathBuf>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let raw = match event {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut raw = String::new();
            tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut raw).await?;
            raw
        }
    };
    let payload: Value = serde_json::from_str(&raw)?;

    match app.invoke(&payload).await {
        Ok(output) => {
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ InvokeError::Event(_)) => {
            eprintln!("Invalid invocation payload: {e}");
            Ok(ExitCode::from(2))
        }
        Err(e @ InvokeError::Unhandled(_)) => {
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn serve(app: Arc<App>, config: &RuntimeConfig, bind: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let address = bind.unwrap_or_else(|| config.server.bind_address.clone());
    let listener = TcpListener::bind(&address).await?;

    let shutdown = app.shutdown().clone();
    spawn_signal_listener(shutdown.clone());

    HttpServer::new(app, &config.server).run(listener, shutdown).await?;
    Ok(())
}

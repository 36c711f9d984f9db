//! MVC router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server (axum, request id, timeout)
//!                          │
//!                          ▼
//!                      routing::Router ──▶ first matching route (registration order)
//!                          │
//!                          ▼
//!                      routing::params ──▶ query + captures, sanitized
//!                          │
//!                          ▼
//!                      dispatch::handler ──▶ action(ctx, params, completion)
//!                          │
//!     Client Response      ▼
//!     ◀─────────────── render (ViewRenderer) | redirect | error
//! ```

use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use mvc_router::config::{load_config, validation::validate_config, RouterConfig};
use mvc_router::dispatch::{Completion, ControllerRegistry, ExecutionContext};
use mvc_router::lifecycle::{signals, Shutdown};
use mvc_router::observability::{logging, metrics};
use mvc_router::{AppHandle, HttpServer, ParamBag, Router};

#[derive(Parser)]
#[command(name = "mvc-router")]
#[command(about = "MVC router server", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `paths.entry_path`.
    #[arg(long)]
    entry_path: Option<PathBuf>,
}

/// Application state shared with every action through the app handle.
struct DemoApp {
    name: &'static str,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(entry_path) = cli.entry_path {
        config.paths.entry_path = entry_path;
    }
    validate_config(&config).map_err(|errors| format!("invalid configuration: {:?}", errors))?;

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("logging already initialized: {}", e);
    }

    tracing::info!("mvc-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes_file = %config.paths.routes_path().display(),
        request_timeout_secs = config.timeouts.request_secs,
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

    // A routes file that cannot be loaded aborts startup.
    let mut router = Router::new(config.paths.clone()).with_controllers(controllers());
    if let Err(e) = router.build_routes() {
        tracing::error!(error = %e, "Failed to build routes");
        return Err(e.into());
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signalled();
    let app = AppHandle::new(DemoApp { name: "mvc-router demo" });
    let server = HttpServer::new(config, router, app);

    tokio::spawn(async move {
        signals::trigger_on_signal(&shutdown).await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn app_name(ctx: &ExecutionContext) -> &'static str {
    ctx.app()
        .downcast_ref::<DemoApp>()
        .map(|app| app.name)
        .unwrap_or("unknown")
}

fn controllers() -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();

    registry
        .register("home", "index", |ctx: ExecutionContext, _params: ParamBag, done: Completion| {
            done.render("home/index", json!({ "app": app_name(&ctx) }));
        })
        .register("users", "login", |_ctx: ExecutionContext, params: ParamBag, done: Completion| {
            done.render("users/login", json!({ "next": params.get("next") }));
        })
        .register("users", "show", |ctx: ExecutionContext, params: ParamBag, done: Completion| {
            let id = params.get("id").cloned().unwrap_or_default();
            if id == "me" {
                ctx.redirect_to("/users/login");
                return;
            }
            tokio::spawn(async move {
                done.render("users/show", json!({ "id": id }));
            });
        })
        .register("admin", "index", |ctx: ExecutionContext, _params: ParamBag, done: Completion| {
            let role = ctx.current_route().get("role");
            done.render("admin/index", json!({ "required_role": role }));
        });

    registry
}

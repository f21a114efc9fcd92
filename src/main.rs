//! chain-router demo server.
//!
//! Registers a small route table and serves it until Ctrl+C.
//!
//! ```text
//!  request ─▶ axum layers ─▶ Dispatcher ─▶ USE "/" ─▶ USE "/api" ─▶ GET "/api/users/:id?"
//!                                             │           │
//!                                          next()      next()
//! ```

use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use chain_router::config::load_config;
use chain_router::http::RequestIdExt;
use chain_router::observability::{logging, metrics};
use chain_router::{handler, App, HandlerError, HttpServer, ServerConfig, Shutdown};

#[derive(Parser)]
#[command(name = "chain-router")]
#[command(about = "Ordered HTTP router with explicit middleware chaining", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn build_app(config: &ServerConfig) -> Result<App, Box<dyn std::error::Error>> {
    let mut app = App::from_config(config);

    app.middleware("/", [handler(|c| {
        tracing::debug!(
            request_id = c.request_id().unwrap_or("unknown"),
            method = %c.method(),
            path = %c.path(),
            "Request received"
        );
        c.next();
        Ok(())
    })])?;

    app.get("/", [handler(|c| {
        c.send("Hello, World!");
        Ok(())
    })])?;

    {
        let mut api = app.group_with("/api", [handler(|c| {
            c.set_header("x-api-version", "1")?;
            c.next();
            Ok(())
        })])?;

        api.get("/users/:id?", [handler(|c| {
            let id = c.param("id");
            if id.is_empty() {
                c.json(&json!({ "users": ["ada", "grace"] }))?;
            } else {
                let id: u32 = id.parse()?;
                c.json(&json!({ "id": id }))?;
            }
            Ok(())
        })])?;

        api.post("/echo", [handler(|c| {
            let body = c.body().clone();
            c.send(body);
            Ok(())
        })])?;

        api.get("/files/*", [handler(|c| {
            let file = c.param("*").to_string();
            c.send(file);
            Ok(())
        })])?;

        api.get("/fail", [handler(|_| Err(HandlerError::msg("intentional failure")))])?;
    }

    Ok(app)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_filter);
    tracing::info!("chain-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        case_sensitive = config.routing.case_sensitive,
        strict_routing = config.routing.strict_routing,
        body_limit = config.limits.body_limit,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = build_app(&config)?.into_dispatcher();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(dispatcher, config)
        .run(listener, Shutdown::new())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create an Axum Router whose fallback feeds every request to the dispatcher
//! - Wire up middleware (tracing, timeout, request ID, server header)
//! - Buffer request bodies up to the configured limit
//! - Serve on a listener until shutdown

use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, request::Parts, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::app::Dispatcher;
use crate::config::ServerConfig;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Failures of the serving loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// State injected into the fallback handler.
#[derive(Clone)]
struct ServeState {
    dispatcher: Dispatcher,
    body_limit: usize,
}

/// HTTP front end for a [`Dispatcher`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        let state = ServeState {
            dispatcher,
            body_limit: config.limits.body_limit,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: ServeState) -> Router {
        let mut router = Router::new().fallback(serve_request).with_state(state);

        if let Some(server) = &config.server_header {
            match HeaderValue::from_str(server) {
                Ok(value) => {
                    router = router.layer(SetResponseHeaderLayer::overriding(header::SERVER, value));
                }
                Err(_) => {
                    tracing::warn!(server_header = %server, "Ignoring invalid server header");
                }
            }
        }

        router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestIdLayer)
                .layer(DefaultBodyLimit::max(config.limits.body_limit))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// The fully layered router, for embedding into another server.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires or Ctrl+C arrives.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffer the body, then run the synchronous handler chain off the async workers.
///
/// A body over the limit is rejected with 413; a body that fails to arrive
/// (client reset, broken stream) with 400.
async fn serve_request(
    State(state): State<ServeState>,
    parts: Parts,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = parts
        .headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(
                request_id = %request_id,
                limit = state.body_limit,
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Request body rejected"
            );
            return rejection.into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        "Dispatching request"
    );

    let method = parts.method.clone();
    let dispatcher = state.dispatcher.clone();
    let request = Request::from_parts(parts, body);
    match tokio::task::spawn_blocking(move || dispatcher.dispatch(request)).await {
        Ok(response) => response.map(Body::from),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Handler chain panicked");
            metrics::record_dispatch(&method, "panic", start);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

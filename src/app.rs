//! Application builder and the frozen dispatcher it produces.
//!
//! # Responsibilities
//! - Collect route registrations (directly or through groups)
//! - Hold the single error handler
//! - Freeze everything into a shareable [`Dispatcher`]
//!
//! # Design Decisions
//! - Registration needs `&mut App`; dispatch needs a `Dispatcher`. The
//!   conversion consumes the builder, so routes cannot change while serving
//! - The dispatcher is an `Arc` around immutable state plus the context pool,
//!   cheap to clone into every worker

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{Method, Request, Response};

use crate::config::schema::ServerConfig;
use crate::dispatch::chain::{self, Handler};
use crate::dispatch::context::Ctx;
use crate::dispatch::error::{default_error_handler, ErrorHandler, HandlerError};
use crate::dispatch::pool::CtxPool;
use crate::observability::metrics;
use crate::routing::group::{compose, Group};
use crate::routing::pattern::{CompileError, RouteOptions};
use crate::routing::router::{MethodFilter, Route, RouteMatch, RouteTable};

/// Default upper bound of idle pooled contexts.
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// Per-method registration shortcuts shared by [`App`] and [`Group`].
macro_rules! method_helpers {
    ($target:ty) => {
        impl $target {
            $crate::app::method_helpers!(@each
                get => GET,
                head => HEAD,
                post => POST,
                put => PUT,
                delete => DELETE,
                connect => CONNECT,
                options => OPTIONS,
                trace => TRACE,
                patch => PATCH
            );

            /// Register handlers for every method at exactly `path`.
            pub fn all(
                &mut self,
                path: &str,
                handlers: impl IntoIterator<Item = $crate::dispatch::chain::Handler>,
            ) -> Result<&mut Self, $crate::routing::pattern::CompileError> {
                self.register($crate::routing::router::MethodFilter::All, path, handlers)
            }

            /// Register middleware for every method at `path` and everything below it.
            pub fn middleware(
                &mut self,
                path: &str,
                handlers: impl IntoIterator<Item = $crate::dispatch::chain::Handler>,
            ) -> Result<&mut Self, $crate::routing::pattern::CompileError> {
                self.register($crate::routing::router::MethodFilter::Use, path, handlers)
            }
        }
    };
    (@each $($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Register handlers for `", stringify!($method), "` requests at `path`.")]
            pub fn $name(
                &mut self,
                path: &str,
                handlers: impl IntoIterator<Item = $crate::dispatch::chain::Handler>,
            ) -> Result<&mut Self, $crate::routing::pattern::CompileError> {
                self.register(::axum::http::Method::$method, path, handlers)
            }
        )*
    };
}

pub(crate) use method_helpers;

/// Route registration front end.
pub struct App {
    table: RouteTable,
    on_error: ErrorHandler,
    max_idle: usize,
}

impl App {
    /// An app with default routing options (case-insensitive, non-strict).
    pub fn new() -> Self {
        Self::with_options(RouteOptions::default())
    }

    pub fn with_options(options: RouteOptions) -> Self {
        Self {
            table: RouteTable::new(options),
            on_error: Arc::new(default_error_handler),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// An app whose routing and pooling follow `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut app = Self::with_options(RouteOptions {
            case_sensitive: config.routing.case_sensitive,
            strict_routing: config.routing.strict_routing,
        });
        app.max_idle = config.pool.max_idle;
        app
    }

    /// Replace the error handler every handler failure is routed to.
    pub fn error_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Ctx, HandlerError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(f);
        self
    }

    /// Register `handlers` for `filter` at `path`.
    pub fn register(
        &mut self,
        filter: impl Into<MethodFilter>,
        path: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<&mut Self, CompileError> {
        self.table
            .register(filter.into(), path, handlers.into_iter().collect())?;
        Ok(self)
    }

    /// A group of routes under `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let prefix = compose("", prefix);
        Group::new(self, prefix)
    }

    /// A group whose `handlers` run as middleware for every route under `prefix`.
    pub fn group_with(
        &mut self,
        prefix: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<Group<'_>, CompileError> {
        let prefix = compose("", prefix);
        self.register(MethodFilter::Use, &prefix, handlers)?;
        Ok(Group::new(self, prefix))
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> &[Route] {
        self.table.routes()
    }

    /// Freeze the route table and start dispatching.
    pub fn into_dispatcher(self) -> Dispatcher {
        tracing::info!(
            routes = self.table.len(),
            case_sensitive = self.table.options().case_sensitive,
            strict_routing = self.table.options().strict_routing,
            "Route table frozen"
        );
        Dispatcher {
            inner: Arc::new(Inner {
                table: self.table,
                on_error: self.on_error,
                pool: CtxPool::new(self.max_idle),
            }),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

method_helpers!(App);

struct Inner {
    table: RouteTable,
    on_error: ErrorHandler,
    pool: CtxPool,
}

/// Read-only routing state shared by every in-flight request.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Run the handler chain for `request` and return the response it built.
    pub fn dispatch(&self, request: Request<Bytes>) -> Response<Bytes> {
        let start = Instant::now();
        let (parts, body) = request.into_parts();

        let mut ctx = self.inner.pool.acquire();
        ctx.load(parts, body);

        let outcome = chain::execute(&self.inner.table, &self.inner.on_error, &mut ctx);
        if outcome == chain::ChainOutcome::NotFound {
            tracing::warn!(method = %ctx.method(), path = %ctx.path(), "No route handled request");
        }
        metrics::record_dispatch(ctx.method(), outcome.as_str(), start);

        ctx.take_response()
    }

    /// First route matching `method` and `path`, with its parameters.
    pub fn find<'a>(&'a self, method: &Method, path: &'a str) -> Option<RouteMatch<'a>> {
        self.inner.table.find(method, path)
    }

    /// Every route matching `method` and `path`, in chain order.
    pub fn matches<'a>(
        &'a self,
        method: &Method,
        path: &'a str,
    ) -> impl Iterator<Item = RouteMatch<'a>> + 'a {
        self.inner.table.matches(method, path)
    }

    pub fn routes(&self) -> &[Route] {
        self.inner.table.routes()
    }

    /// Contexts currently idle in the pool.
    pub fn idle_contexts(&self) -> usize {
        self.inner.pool.idle()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.inner.table.len())
            .field("idle_contexts", &self.inner.pool.idle())
            .finish()
    }
}

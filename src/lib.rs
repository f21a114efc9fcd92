//! Ordered HTTP router with explicit middleware chaining.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use app::{App, Dispatcher};
pub use config::schema::ServerConfig;
pub use dispatch::{handler, Ctx, Handler, HandlerError, HandlerResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Group, MethodFilter};

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (add request ID)
//!     → server.rs fallback (buffer body, hand off to Dispatcher)
//!     → Dispatcher (route, run handler chain) on a blocking worker
//!     → Response<Bytes> back through the layers to the client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};

//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (method, uri, headers, body)
//!     → pool.rs (lease a reset Ctx)
//!     → context.rs (load request, split path)
//!     → chain.rs (match → run handlers → match next → ...)
//!         → error.rs (on failure: single error handler)
//!     → Ctx response taken, Ctx returned to pool
//! ```
//!
//! # Design Decisions
//! - Handlers are synchronous; continuation is explicit via `Ctx::next`
//! - One Ctx per in-flight request, never shared
//! - The route table is only read here

pub mod chain;
pub mod context;
pub mod error;
pub mod pool;

pub use chain::{handler, ChainOutcome, Handler, HandlerResult};
pub use context::Ctx;
pub use error::{default_error_handler, ErrorHandler, HandlerError};
pub use pool::{CtxPool, PooledCtx};

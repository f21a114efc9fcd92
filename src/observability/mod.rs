//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration, dispatch and serving produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (request counters, dispatch latency)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the serving layer into every span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

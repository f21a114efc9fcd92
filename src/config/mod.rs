//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → consumed by App (routing, pool) and HttpServer (listener, limits)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; routing options are baked into
//!   compiled patterns at registration
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, PoolConfig, RoutingConfig, ServerConfig,
    TimeoutConfig,
};
pub use validation::ValidationError;

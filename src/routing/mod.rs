//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before serving):
//!     path (+ group prefixes)
//!     → group.rs (compose prefix and child path)
//!     → pattern.rs (compile into typed segments)
//!     → router.rs (append to the ordered route table)
//!
//! Lookup (per request, and again after every continue):
//!     method + path
//!     → router.rs (ordered scan from a start index)
//!     → matcher.rs (segment-wise match, captures)
//!     → Return: route index + captures, or NoMatch
//! ```
//!
//! # Design Decisions
//! - Registration order is the only precedence rule
//! - Patterns compiled once; matching never allocates per segment
//! - Deterministic: same input always matches the same routes

pub mod group;
pub mod matcher;
pub mod pattern;
pub mod router;

pub use group::{compose, Group};
pub use pattern::{CompileError, Pattern, RouteOptions, Segment, WILDCARD_PARAM};
pub use router::{MethodFilter, Route, RouteMatch, RouteTable};

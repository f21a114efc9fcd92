//! Chain execution.
//!
//! # Responsibilities
//! - Run the handlers of every matching route in registration order
//! - Advance only when a handler explicitly continued
//! - Route failures to the single error handler
//!
//! # Design Decisions
//! - An explicit cursor (route index, handler index) plus a `continued` flag,
//!   never recursion through `next()`
//! - The next matching route is looked up lazily, only when the chain actually
//!   runs past the current route's handlers
//! - Falling off the end of the chain is a 404, same as not matching at all

use std::sync::Arc;

use axum::http::StatusCode;

use crate::dispatch::context::Ctx;
use crate::dispatch::error::{ErrorHandler, HandlerError};
use crate::routing::router::RouteTable;

/// What a handler returns; `Err` short-circuits to the error handler.
pub type HandlerResult = Result<(), HandlerError>;

/// A registered request handler.
pub type Handler = Arc<dyn Fn(&mut Ctx) -> HandlerResult + Send + Sync>;

/// Wrap a closure or function as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Ctx) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// How a dispatched chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// A handler finished the response without continuing.
    Completed,
    /// No route matched, or the last handler continued into nothing.
    NotFound,
    /// A handler failed and the error handler wrote the response.
    Failed,
}

impl ChainOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainOutcome::Completed => "matched",
            ChainOutcome::NotFound => "not_found",
            ChainOutcome::Failed => "handler_error",
        }
    }
}

/// Run the chain for the request loaded into `ctx`.
pub fn execute(table: &RouteTable, on_error: &ErrorHandler, ctx: &mut Ctx) -> ChainOutcome {
    let mut from = 0;
    loop {
        let found = {
            let (method, path, segments, captures) = ctx.split_for_match();
            table.find_from(from, method, path, segments, captures)
        };
        let Some(index) = found else {
            not_found(ctx);
            return ChainOutcome::NotFound;
        };

        ctx.route = Some(index);
        for (position, handler) in table.routes()[index].handlers().iter().enumerate() {
            ctx.handler = position;
            ctx.continued = false;

            let result = handler(ctx).and_then(|()| ctx.pending.take().map_or(Ok(()), Err));
            if let Err(err) = result {
                tracing::debug!(
                    route = index,
                    handler = position,
                    error = %err,
                    "Handler failed"
                );
                on_error(ctx, err);
                return ChainOutcome::Failed;
            }
            if !ctx.continued {
                return ChainOutcome::Completed;
            }
        }
        from = index + 1;
    }
}

fn not_found(ctx: &mut Ctx) {
    let body = format!("Cannot {} {}", ctx.method(), ctx.path());
    ctx.status(StatusCode::NOT_FOUND).send(body);
}

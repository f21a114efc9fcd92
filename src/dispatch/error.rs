//! Handler failures and the error handler they are routed to.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::dispatch::context::Ctx;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure raised by a handler, either returned or passed to [`Ctx::next_with`].
///
/// Any `std::error::Error` converts into it, so handlers can use `?`.
pub struct HandlerError {
    status: Option<StatusCode>,
    source: BoxError,
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

impl HandlerError {
    /// An error carrying only a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self {
            status: None,
            source: Box::new(Message(message.to_string())),
        }
    }

    /// An error that asks the error handler for a specific status.
    pub fn with_status(status: StatusCode, message: impl fmt::Display) -> Self {
        Self {
            status: Some(status),
            ..Self::msg(message)
        }
    }

    /// Status requested by the handler, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The underlying error.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self {
            status: None,
            source: Box::new(err),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("status", &self.status)
            .field("source", &self.source)
            .finish()
    }
}

/// Receives every handler failure for a request and writes the response.
pub type ErrorHandler = Arc<dyn Fn(&mut Ctx, HandlerError) + Send + Sync>;

/// Writes the error's status (500 when none) and its message as the body.
pub fn default_error_handler(ctx: &mut Ctx, err: HandlerError) {
    let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    ctx.status(status).send(err.to_string());
}

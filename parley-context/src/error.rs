//! Error types for execution context construction.

use thiserror::Error;

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

/// Errors raised while building or reading an execution context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The request body is not a JSON object.
    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The request body does not match the invocation request shape.
    #[error("malformed request: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    /// The resolution status variable holds something that is not a status.
    #[error("malformed resolution status in '{variable}': {source}")]
    MalformedStatus {
        variable: String,
        #[source]
        source: serde_json::Error,
    },

    /// An event handler was invoked without naming the bag variable to resolve.
    #[error("request does not name a state variable")]
    MissingState,
}

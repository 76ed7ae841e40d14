//! Execution context for Parley component invocations.
//!
//! Wraps one inbound request and accumulates the response (variables,
//! outbound messages, turn control) while a component runs.

mod context;
mod error;
mod request;
mod response;

pub use context::{DEFAULT_PLATFORM_VERSION, ExecutionContext, Extensions};
pub use error::{ContextError, ContextResult};
pub use request::{ConversationContext, InboundMessage, InvocationRequest};
pub use response::ResponseSnapshot;

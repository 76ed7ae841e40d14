//! Core data model for Parley.
//!
//! Defines the types that the invocation runtime and the entity resolution
//! state machine share:
//! - [`Record`]: one instance of a composite bag (slot name → raw value)
//! - [`CompositeBagType`] / [`BagItem`]: the read-only bag schema
//! - [`Variable`]: a conversation variable as it travels in a request
//! - [`ResolutionStatus`]: the turn-scoped slot-filling state
//! - [`ResolutionEvent`] / [`EventKind`]: the event that triggers a handler
//! - [`MessageEnvelope`]: one outbound message
//!
//! All types round-trip through JSON using the camelCase wire names of the
//! conversation platform.

mod event;
mod message;
mod record;
mod schema;
mod status;

pub use event::{EventKind, ResolutionEvent};
pub use message::MessageEnvelope;
pub use record::{ENTITY_NAME_KEY, Record};
pub use schema::{BagItem, CompositeBagType, Variable};
pub use status::ResolutionStatus;

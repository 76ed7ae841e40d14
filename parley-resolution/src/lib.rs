//! Composite bag entity resolution for Parley.
//!
//! - [`EntityResolver`]: the per-turn state machine over a
//!   [`ResolutionStatus`](parley_model::ResolutionStatus) and the active record
//! - [`DisplayRegistry`]: display descriptors keyed by entity type

mod display;
mod resolver;

pub use display::{DisplayDescriptor, DisplayRegistry, DisplayTransform};
pub use resolver::{DisplayValue, EntityResolver};

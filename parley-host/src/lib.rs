//! Parley component host.
//!
//! - [`ComponentRegistry`]: named components, regular or event-handler
//! - [`Dispatcher`]: metadata listing and invocation with one result per call
//! - [`EventRouter`]: delivers pending resolution events to handlers
//! - [`RuntimeConfig`]: TOML runtime settings

mod component;
mod config;
mod dispatcher;
mod error;
mod registry;
mod router;

pub use component::{
    Completion, Component, ComponentMetadata, CustomComponent, EventHandler, EventHandlerBuilder,
    EventHandlerComponent, METADATA_CAPABILITY,
};
pub use config::{
    DEFAULT_RUNTIME_VERSION, DEFAULT_STATUS_VARIABLE, DisplaySection, RuntimeConfig, RuntimeSection,
};
pub use dispatcher::{Dispatcher, MetadataListing};
pub use error::{ConfigError, InvocationError, RegistryError};
pub use registry::ComponentRegistry;
pub use router::EventRouter;

pub use parley_context::{ExecutionContext, Extensions, ResponseSnapshot};
pub use parley_model::{Record, ResolutionEvent, ResolutionStatus};
pub use parley_resolution::EntityResolver;

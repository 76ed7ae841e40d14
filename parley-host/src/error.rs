//! Error types for the component host.

use parley_context::ContextError;
use serde_json::{Value, json};
use std::any::Any;
use thiserror::Error;

/// Registry contract violations. Raised synchronously while registering or
/// validating components, before any invocation can start.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("component already registered: {0}")]
    DuplicateComponent(String),

    #[error("component name must not be empty")]
    EmptyName,

    #[error(
        "component '{component}' declares eventHandler={declared} but is registered as a {variant} component"
    )]
    VariantMismatch {
        component: String,
        declared: bool,
        variant: &'static str,
    },

    #[error("event '{event}' registered twice on component '{component}'")]
    DuplicateEvent { component: String, event: String },

    #[error("event name '{0}' is reserved")]
    ReservedEvent(String),
}

/// Failures delivered through the invocation callback.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("bad request: {0}")]
    BadRequest(#[from] ContextError),

    #[error("component '{component}' failed: {source}")]
    ComponentFailed {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("component '{component}' panicked: {message}")]
    Panicked { component: String, message: String },
}

impl InvocationError {
    /// Stable error name as seen by callers on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnknownComponent(_) => "unknownComponent",
            Self::BadRequest(_) => "badRequest",
            Self::ComponentFailed { .. } => "componentError",
            Self::Panicked { .. } => "internalError",
        }
    }

    /// `{name, message}` JSON for callers that expect the wire error shape.
    pub fn to_wire(&self) -> Value {
        json!({
            "name": self.name(),
            "message": self.to_string(),
        })
    }

    pub(crate) fn panicked(component: &str, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panicked {
            component: component.to_string(),
            message,
        }
    }
}

/// Errors loading a runtime configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

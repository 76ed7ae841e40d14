//! Component traits and the two component variants.
//!
//! A component is either a regular component with a single `invoke`
//! operation, or an event-handler component that maps resolution event names
//! to handlers. The variant is fixed at registration time.

use crate::error::RegistryError;
use async_trait::async_trait;
use parley_context::ExecutionContext;
use parley_model::{EventKind, ResolutionEvent};
use parley_resolution::EntityResolver;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Name reserved for the metadata capability; never a valid event name.
pub const METADATA_CAPABILITY: &str = "metadata";

/// Self-description a component reports to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_actions: Vec<String>,
    #[serde(default)]
    pub event_handler: bool,
    /// Filled in by the dispatcher for event-handler components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

impl ComponentMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Metadata for an event-handler component.
    pub fn event_handler(name: impl Into<String>) -> Self {
        Self {
            event_handler: true,
            ..Self::new(name)
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_actions = actions.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// Completion
// ============================================================================

/// How a regular component reports completion.
#[derive(Debug)]
pub enum Completion {
    Done,
    /// Older components complete by handing the context back in the error
    /// position. Treated as success.
    EchoedContext,
    Failed(anyhow::Error),
}

impl From<anyhow::Result<()>> for Completion {
    fn from(result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Normalized completion. The echoed-context convention does not survive
/// past this point.
#[derive(Debug)]
pub(crate) enum Outcome {
    Success,
    Failure(anyhow::Error),
}

impl From<Completion> for Outcome {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Done | Completion::EchoedContext => Self::Success,
            Completion::Failed(e) => Self::Failure(e),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A regular component.
#[async_trait]
pub trait CustomComponent: Send + Sync {
    fn metadata(&self) -> ComponentMetadata;

    async fn invoke(&self, ctx: &mut ExecutionContext) -> Completion;
}

/// Handles one resolution event.
///
/// The execution context is reachable through
/// [`EntityResolver::context_mut`]. For `should…` events the returned boolean
/// becomes `promptForValue`; `None` counts as `true`. Other events ignore it.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(
        &self,
        event: &ResolutionEvent,
        resolver: &mut EntityResolver<'_>,
    ) -> anyhow::Result<Option<bool>>;
}

// ============================================================================
// Event-handler components
// ============================================================================

pub(crate) struct RegisteredHandler {
    pub(crate) event: String,
    pub(crate) kind: EventKind,
    pub(crate) handler: Arc<dyn EventHandler>,
}

/// A component whose capabilities are named event handlers.
pub struct EventHandlerComponent {
    metadata: ComponentMetadata,
    handlers: Vec<RegisteredHandler>,
}

impl EventHandlerComponent {
    pub fn builder(metadata: ComponentMetadata) -> EventHandlerBuilder {
        EventHandlerBuilder {
            metadata,
            handlers: Vec::new(),
        }
    }

    pub fn metadata(&self) -> &ComponentMetadata {
        &self.metadata
    }

    /// Handled event names in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.event.as_str())
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handler(event).is_some()
    }

    pub(crate) fn handler(&self, event: &str) -> Option<&RegisteredHandler> {
        self.handlers.iter().find(|h| h.event == event)
    }
}

impl fmt::Debug for EventHandlerComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlerComponent")
            .field("name", &self.metadata.name)
            .field("events", &self.events().collect::<Vec<_>>())
            .finish()
    }
}

pub struct EventHandlerBuilder {
    metadata: ComponentMetadata,
    handlers: Vec<(String, Arc<dyn EventHandler>)>,
}

impl EventHandlerBuilder {
    pub fn on(mut self, event: impl Into<String>, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push((event.into(), Arc::new(handler)));
        self
    }

    pub fn build(self) -> Result<EventHandlerComponent, RegistryError> {
        let mut handlers: Vec<RegisteredHandler> = Vec::with_capacity(self.handlers.len());
        for (event, handler) in self.handlers {
            if event == METADATA_CAPABILITY {
                return Err(RegistryError::ReservedEvent(event));
            }
            if handlers.iter().any(|h| h.event == event) {
                return Err(RegistryError::DuplicateEvent {
                    component: self.metadata.name,
                    event,
                });
            }
            handlers.push(RegisteredHandler {
                kind: EventKind::classify(&event),
                event,
                handler,
            });
        }
        Ok(EventHandlerComponent {
            metadata: self.metadata,
            handlers,
        })
    }
}

// ============================================================================
// Component
// ============================================================================

/// A registered component.
#[derive(Clone)]
pub enum Component {
    Regular(Arc<dyn CustomComponent>),
    EventHandler(Arc<EventHandlerComponent>),
}

impl Component {
    pub fn regular(component: impl CustomComponent + 'static) -> Self {
        Self::Regular(Arc::new(component))
    }

    pub fn event_handler(component: EventHandlerComponent) -> Self {
        Self::EventHandler(Arc::new(component))
    }

    /// Metadata as reported to callers. Event-handler components list their
    /// event names.
    pub fn metadata(&self) -> ComponentMetadata {
        match self {
            Self::Regular(c) => c.metadata(),
            Self::EventHandler(c) => {
                let mut metadata = c.metadata().clone();
                metadata.events = Some(c.events().map(str::to_string).collect());
                metadata
            }
        }
    }

    pub fn is_event_handler(&self) -> bool {
        matches!(self, Self::EventHandler(_))
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Self::Regular(_) => "regular",
            Self::EventHandler(_) => "event handler",
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular(c) => f.debug_tuple("Regular").field(&c.metadata().name).finish(),
            Self::EventHandler(c) => f.debug_tuple("EventHandler").field(c).finish(),
        }
    }
}

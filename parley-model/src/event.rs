use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The pending event carried by a [`ResolutionStatus`](crate::ResolutionStatus).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionEvent {
    pub name: String,
    /// Slot the event concerns, when it is item-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Any further event attributes, passed through untouched.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ResolutionEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item: None,
            properties: Map::new(),
        }
    }

    pub fn for_item(name: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item: Some(item.into()),
            properties: Map::new(),
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::classify(&self.name)
    }
}

/// How the outcome of an event handler is interpreted.
///
/// Event names follow a naming convention: names starting with `should` are
/// predicates whose boolean result becomes `promptForValue`, and names
/// starting with `shouldPrompt` additionally default `promptForValue` to
/// `true` when no handler is registered. This is the only place that
/// convention is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `shouldPrompt…`: predicate; prompt by default when unhandled.
    ShouldPrompt,
    /// `should…`: predicate; state untouched when unhandled.
    Predicate,
    /// Anything else; the handler result is ignored.
    Notification,
}

impl EventKind {
    pub fn classify(name: &str) -> Self {
        if name.starts_with("shouldPrompt") {
            Self::ShouldPrompt
        } else if name.starts_with("should") {
            Self::Predicate
        } else {
            Self::Notification
        }
    }

    /// Whether a handler result should be written to `promptForValue`.
    pub fn is_predicate(self) -> bool {
        matches!(self, Self::ShouldPrompt | Self::Predicate)
    }

    /// The `promptForValue` to apply when no handler exists, if any.
    pub fn unhandled_prompt_default(self) -> Option<bool> {
        match self {
            Self::ShouldPrompt => Some(true),
            Self::Predicate | Self::Notification => None,
        }
    }
}

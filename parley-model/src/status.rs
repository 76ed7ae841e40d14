use crate::event::ResolutionEvent;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Turn-scoped slot-filling state for one composite bag variable.
///
/// Created upstream once per turn and persisted (or discarded) by the
/// conversation platform after the invocation. Invariants maintained by the
/// resolver:
/// - a set `resolving_field` never appears in `skipped_items`
/// - `disambiguation_values` is drained in full by a queue expansion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolving_field: Option<String>,
    #[serde(default)]
    pub skipped_items: Vec<String>,
    #[serde(default)]
    pub disambiguation_values: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    pub entity_queue: Vec<Record>,
    #[serde(default)]
    pub resolved_entities: Vec<Record>,
    #[serde(default)]
    pub validation_errors: BTreeMap<String, String>,

    // Turn-local auxiliary fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_for_value: Option<bool>,
    #[serde(default)]
    pub updated_entities: Vec<Value>,
    #[serde(default)]
    pub out_of_order_matches: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<ResolutionEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
}

impl ResolutionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a status with a pending event.
    pub fn with_event(event: ResolutionEvent) -> Self {
        Self {
            event: Some(event),
            ..Self::default()
        }
    }

    /// Whether `slot` is currently deferred.
    pub fn is_skipped(&self, slot: &str) -> bool {
        self.skipped_items.iter().any(|s| s == slot)
    }

    /// Whether any slot still has candidate values awaiting disambiguation.
    pub fn is_disambiguating(&self) -> bool {
        self.disambiguation_values.values().any(|v| !v.is_empty())
    }
}

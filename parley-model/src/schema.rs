use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A conversation variable as carried in `context.variables`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(rename = "type", default)]
    pub var_type: CompositeBagType,
    #[serde(default)]
    pub value: Value,
}

impl Variable {
    pub fn new(var_type: CompositeBagType, value: Value) -> Self {
        Self { var_type, value }
    }

    /// A plain variable with no bag schema.
    pub fn plain(type_name: &str, value: Value) -> Self {
        Self {
            var_type: CompositeBagType::new(type_name),
            value,
        }
    }
}

/// Describes a variable's type. For composite bags, `composite_bag_items`
/// lists the slots in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeBagType {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composite_bag_items: Vec<BagItem>,
}

impl CompositeBagType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            composite_bag_items: Vec::new(),
        }
    }

    pub fn with_items(name: &str, items: Vec<BagItem>) -> Self {
        Self {
            name: name.into(),
            composite_bag_items: items,
        }
    }

    /// Looks up a slot definition by name.
    pub fn item(&self, slot: &str) -> Option<&BagItem> {
        self.composite_bag_items.iter().find(|i| i.name == slot)
    }
}

/// One slot definition within a composite bag.
///
/// `entity_name` references the entity type of the slot value. Only slots
/// that reference a type get type-specific display formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagItem {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

impl BagItem {
    /// Shorthand for a free-text slot with no type reference.
    pub fn text(name: &str) -> Self {
        Self {
            name: name.into(),
            item_type: Some("STRING".into()),
            entity_name: None,
        }
    }

    /// Shorthand for a slot whose value is an entity of `entity_name`.
    pub fn entity(name: &str, entity_name: &str) -> Self {
        Self {
            name: name.into(),
            item_type: Some("ENTITY".into()),
            entity_name: Some(entity_name.into()),
        }
    }

    /// The type this slot references, if any.
    pub fn type_ref(&self) -> Option<&str> {
        self.entity_name.as_deref()
    }
}

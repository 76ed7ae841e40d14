use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which a record carries the name of its composite bag type.
pub const ENTITY_NAME_KEY: &str = "entityName";

/// One instance of a composite bag under resolution.
///
/// A record maps slot names to raw values. Slot values are arbitrary JSON;
/// system entity values (dates, amounts) arrive as nested objects and are
/// only turned into display text by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh record tagged with the bag's type name.
    pub fn tagged(type_name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(ENTITY_NAME_KEY.to_string(), Value::String(type_name.to_string()));
        Self(fields)
    }

    /// Builds a record from a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|fields| Self(fields.clone()))
    }

    pub fn get(&self, slot: &str) -> Option<&Value> {
        self.0.get(slot)
    }

    /// Extract a string slot value.
    pub fn get_str(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).and_then(|v| v.as_str())
    }

    /// Sets a slot, returning the previous value.
    pub fn set(&mut self, slot: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(slot.into(), value)
    }

    pub fn remove(&mut self, slot: &str) -> Option<Value> {
        self.0.remove(slot)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.0.contains_key(slot)
    }

    /// The bag type name this record was tagged with, if any.
    pub fn entity_name(&self) -> Option<&str> {
        self.get_str(ENTITY_NAME_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

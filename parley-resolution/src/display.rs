//! Display descriptors: how raw entity values are rendered for users.
//!
//! System entity values arrive as objects (`{"amount": 12.5, "currency":
//! "USD"}`). A descriptor names the subfields that make up the display text
//! and optionally a transform applied to the first of them.

use chrono::DateTime;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts the first subfield's raw value into its display value.
pub type DisplayTransform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

#[derive(Clone)]
pub struct DisplayDescriptor {
    pub subfields: Vec<String>,
    pub transform: Option<DisplayTransform>,
}

impl DisplayDescriptor {
    pub fn new<I, S>(subfields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subfields: subfields.into_iter().map(Into::into).collect(),
            transform: None,
        }
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Renders a raw entity value with this descriptor.
    pub fn render(&self, raw: &Value) -> Value {
        if let Some(transform) = &self.transform {
            let first = self
                .subfields
                .first()
                .and_then(|f| raw.get(f))
                .unwrap_or(&Value::Null);
            return transform(first);
        }
        let parts: Vec<String> = self
            .subfields
            .iter()
            .map(|f| raw.get(f).map(display_text).unwrap_or_default())
            .collect();
        Value::String(parts.join(" "))
    }
}

impl fmt::Debug for DisplayDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayDescriptor")
            .field("subfields", &self.subfields)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Descriptor table keyed by type reference.
#[derive(Debug, Clone)]
pub struct DisplayRegistry {
    descriptors: HashMap<String, DisplayDescriptor>,
}

impl DisplayRegistry {
    /// A table with no descriptors; every value renders unchanged.
    pub fn empty() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// A table seeded with the system entity descriptors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("DATE", DisplayDescriptor::new(["date"]).with_transform(format_date));
        registry.register("CURRENCY", DisplayDescriptor::new(["amount", "currency"]));
        registry.register("NUMBER", DisplayDescriptor::new(["number"]));
        registry.register("YES_NO", DisplayDescriptor::new(["yesno"]));
        registry
    }

    /// Adds or replaces the descriptor for `type_ref`.
    pub fn register(
        &mut self,
        type_ref: impl Into<String>,
        descriptor: DisplayDescriptor,
    ) -> Option<DisplayDescriptor> {
        self.descriptors.insert(type_ref.into(), descriptor)
    }

    pub fn get(&self, type_ref: &str) -> Option<&DisplayDescriptor> {
        self.descriptors.get(type_ref)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Renders `raw` using the descriptor for `type_ref`, or returns it
    /// unchanged when none is registered.
    pub fn display_value(&self, type_ref: &str, raw: &Value) -> Value {
        match self.descriptors.get(type_ref) {
            Some(descriptor) => descriptor.render(raw),
            None => raw.clone(),
        }
    }
}

impl Default for DisplayRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Epoch milliseconds → `YYYY-MM-DD` (UTC). Non-numeric values pass through.
fn format_date(raw: &Value) -> Value {
    raw.as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| Value::String(dt.format("%Y-%m-%d").to_string()))
        .unwrap_or_else(|| raw.clone())
}

//! Component registry.
//!
//! Names are unique and registration order is preserved; `list_metadata`
//! reports components in the order they were registered.

use crate::component::{Component, CustomComponent, EventHandlerComponent};
use crate::error::RegistryError;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    components: Vec<(String, Component)>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `component` under `name`.
    pub fn register(&mut self, name: impl Into<String>, component: Component) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateComponent(name));
        }

        info!(component = %name, event_handler = component.is_event_handler(), "Component registered");
        self.index.insert(name.clone(), self.components.len());
        self.components.push((name, component));
        Ok(())
    }

    /// Registers a regular component under its metadata name.
    pub fn register_component(&mut self, component: impl CustomComponent + 'static) -> Result<(), RegistryError> {
        let name = component.metadata().name;
        self.register(name, Component::regular(component))
    }

    /// Registers an event-handler component under its metadata name.
    pub fn register_event_handler(&mut self, component: EventHandlerComponent) -> Result<(), RegistryError> {
        let name = component.metadata().name.clone();
        self.register(name, Component::event_handler(component))
    }

    /// Builder-style [`register_component`](Self::register_component).
    pub fn with_component(mut self, component: impl CustomComponent + 'static) -> Result<Self, RegistryError> {
        self.register_component(component)?;
        Ok(self)
    }

    /// Builder-style [`register_event_handler`](Self::register_event_handler).
    pub fn with_event_handler(mut self, component: EventHandlerComponent) -> Result<Self, RegistryError> {
        self.register_event_handler(component)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.index.get(name).map(|&i| &self.components[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Components in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.components.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Checks that every component's declared `eventHandler` flag matches
    /// the variant it was registered as.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for (name, component) in &self.components {
            let declared = component.metadata().event_handler;
            if declared != component.is_event_handler() {
                return Err(RegistryError::VariantMismatch {
                    component: name.clone(),
                    declared,
                    variant: component.variant_name(),
                });
            }
        }
        Ok(())
    }
}

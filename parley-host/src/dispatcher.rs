//! Component dispatcher.
//!
//! Owns the validated registry and turns one invocation request into exactly
//! one result: a response snapshot or an [`InvocationError`].

use crate::component::{Component, ComponentMetadata, CustomComponent, Outcome};
use crate::config::RuntimeConfig;
use crate::error::{InvocationError, RegistryError};
use crate::registry::ComponentRegistry;
use crate::router::EventRouter;
use futures::FutureExt;
use parley_context::{ExecutionContext, Extensions, ResponseSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Reply to a metadata request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataListing {
    pub version: String,
    pub components: Vec<ComponentMetadata>,
}

pub struct Dispatcher {
    registry: Arc<ComponentRegistry>,
    config: RuntimeConfig,
    router: EventRouter,
}

impl Dispatcher {
    /// Creates a dispatcher with the default runtime configuration.
    pub fn new(registry: ComponentRegistry) -> Result<Self, RegistryError> {
        Self::with_config(registry, RuntimeConfig::default())
    }

    pub fn with_config(registry: ComponentRegistry, config: RuntimeConfig) -> Result<Self, RegistryError> {
        registry.validate()?;
        info!(
            components = registry.len(),
            version = %config.version(),
            "Dispatcher ready"
        );
        Ok(Self {
            router: EventRouter::new(&config),
            registry: Arc::new(registry),
            config,
        })
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // ================================================================
    // Metadata
    // ================================================================

    /// Metadata of every registered component, in registration order.
    pub fn list_metadata(&self) -> MetadataListing {
        MetadataListing {
            version: self.config.version().to_string(),
            components: self.registry.iter().map(|(_, c)| c.metadata()).collect(),
        }
    }

    // ================================================================
    // Invocation
    // ================================================================

    /// Invokes component `name` with a raw request body.
    ///
    /// Unknown names, malformed requests, component failures and panics all
    /// come back as `Err`.
    pub async fn invoke(
        &self,
        name: &str,
        request_body: Value,
        extensions: Option<Extensions>,
    ) -> Result<ResponseSnapshot, InvocationError> {
        let invocation_id = Uuid::now_v7();
        let span = info_span!("invoke", component = %name, %invocation_id);
        self.invoke_inner(name, request_body, extensions)
            .instrument(span)
            .await
    }

    /// Callback form of [`invoke`](Self::invoke). `callback` runs exactly
    /// once with the invocation's result.
    pub async fn invoke_with_callback<F>(
        &self,
        name: &str,
        request_body: Value,
        extensions: Option<Extensions>,
        callback: F,
    ) where
        F: FnOnce(Result<ResponseSnapshot, InvocationError>),
    {
        callback(self.invoke(name, request_body, extensions).await);
    }

    async fn invoke_inner(
        &self,
        name: &str,
        request_body: Value,
        extensions: Option<Extensions>,
    ) -> Result<ResponseSnapshot, InvocationError> {
        let Some(component) = self.registry.get(name) else {
            warn!("Unknown component");
            return Err(InvocationError::UnknownComponent(name.to_string()));
        };

        let mut ctx = ExecutionContext::new(request_body, extensions).map_err(|e| {
            warn!(error = %e, "Rejected malformed request");
            InvocationError::BadRequest(e)
        })?;

        let result = match component {
            Component::Regular(c) => invoke_regular(name, c.as_ref(), &mut ctx).await,
            Component::EventHandler(c) => self.router.route(name, c, &mut ctx).await,
        };
        match &result {
            Ok(_) => info!("Invocation complete"),
            Err(e) => warn!(error = %e, kind = e.name(), "Invocation failed"),
        }
        result
    }
}

async fn invoke_regular(
    name: &str,
    component: &dyn CustomComponent,
    ctx: &mut ExecutionContext,
) -> Result<ResponseSnapshot, InvocationError> {
    let completion = AssertUnwindSafe(component.invoke(ctx))
        .catch_unwind()
        .await
        .map_err(|panic| InvocationError::panicked(name, panic))?;

    match Outcome::from(completion) {
        Outcome::Success => Ok(ctx.response()),
        Outcome::Failure(source) => Err(InvocationError::ComponentFailed {
            component: name.to_string(),
            source,
        }),
    }
}

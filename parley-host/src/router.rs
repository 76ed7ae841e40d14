//! Routes pending resolution events to event-handler components.

use crate::component::EventHandlerComponent;
use crate::config::RuntimeConfig;
use crate::error::InvocationError;
use futures::FutureExt;
use parley_context::{ContextError, ExecutionContext, ResponseSnapshot};
use parley_resolution::{DisplayRegistry, EntityResolver};
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct EventRouter {
    status_variable: String,
    display: DisplayRegistry,
}

impl EventRouter {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            status_variable: config.status_variable().to_string(),
            display: config.display_registry(),
        }
    }

    pub fn status_variable(&self) -> &str {
        &self.status_variable
    }

    /// Handles the pending resolution event of one turn.
    ///
    /// Without a status, or with a status carrying no event, the context is
    /// returned untouched. Otherwise the matching handler runs against a
    /// resolver over the bag variable named by the request state, and the
    /// resolver's status is written back to the context afterwards, also
    /// when the handler fails.
    pub async fn route(
        &self,
        name: &str,
        component: &EventHandlerComponent,
        ctx: &mut ExecutionContext,
    ) -> Result<ResponseSnapshot, InvocationError> {
        let Some(status) = ctx.entity_status(&self.status_variable)? else {
            debug!(component = %name, "No resolution status, nothing to route");
            return Ok(ctx.response());
        };
        let Some(event) = status.event.clone() else {
            debug!(component = %name, "Resolution status has no pending event");
            return Ok(ctx.response());
        };

        let variable = ctx
            .state()
            .map(str::to_string)
            .or_else(|| status.variable_name.clone())
            .ok_or(ContextError::MissingState)?;

        let mut resolver = EntityResolver::with_display(ctx, &variable, status, self.display.clone());

        let result = match component.handler(&event.name) {
            Some(registered) => {
                debug!(component = %name, event = %event.name, "Dispatching resolution event");
                let handled = AssertUnwindSafe(registered.handler.handle(&event, &mut resolver))
                    .catch_unwind()
                    .await;
                match handled {
                    Ok(Ok(prompt)) => {
                        if registered.kind.is_predicate() {
                            resolver.set_prompt_for_value(prompt.unwrap_or(true));
                        }
                        Ok(())
                    }
                    Ok(Err(source)) => {
                        warn!(component = %name, event = %event.name, error = %source, "Event handler failed");
                        Err(InvocationError::ComponentFailed {
                            component: name.to_string(),
                            source,
                        })
                    }
                    Err(panic) => {
                        warn!(component = %name, event = %event.name, "Event handler panicked");
                        Err(InvocationError::panicked(name, panic))
                    }
                }
            }
            None => {
                debug!(component = %name, event = %event.name, "No handler for resolution event");
                if let Some(prompt) = event.kind().unhandled_prompt_default() {
                    resolver.set_prompt_for_value(prompt);
                }
                Ok(())
            }
        };

        let status = resolver.into_status();
        ctx.set_entity_status(&self.status_variable, &status);
        result.map(|()| ctx.response())
    }
}

//! The per-invocation execution context.
//!
//! One context is built per `invoke()` from the request body. Components read
//! the request through it and mutate the response (variables, messages,
//! turn control); the dispatcher resolves with [`ExecutionContext::response`]
//! once the component completes.

use crate::error::{ContextError, ContextResult};
use crate::request::{ConversationContext, InvocationRequest};
use crate::response::ResponseSnapshot;
use parley_model::{CompositeBagType, MessageEnvelope, ResolutionStatus, Variable};
use serde_json::{Map, Value};
use tracing::debug;

/// Platform version reported when the request does not carry one.
pub const DEFAULT_PLATFORM_VERSION: &str = "1.1";

/// Caller-supplied properties layered over the request's own `properties`.
pub type Extensions = Map<String, Value>;

pub struct ExecutionContext {
    request: InvocationRequest,
    properties: Map<String, Value>,
    context: ConversationContext,
    messages: Vec<MessageEnvelope>,
    keep_turn: bool,
    transition: bool,
    action: Option<String>,
}

impl ExecutionContext {
    /// Builds a context from a raw request body and optional extensions.
    ///
    /// Extension keys override request properties of the same name.
    pub fn new(request_body: Value, extensions: Option<Extensions>) -> ContextResult<Self> {
        if !request_body.is_object() {
            return Err(ContextError::NotAnObject(json_type_name(&request_body)));
        }
        let request: InvocationRequest =
            serde_json::from_value(request_body).map_err(ContextError::MalformedRequest)?;

        let mut properties = request.properties.clone();
        if let Some(extensions) = extensions {
            debug!(count = extensions.len(), "Merging context extensions");
            properties.extend(extensions);
        }

        Ok(Self {
            context: request.context.clone(),
            request,
            properties,
            messages: Vec::new(),
            keep_turn: false,
            transition: false,
            action: None,
        })
    }

    /// The inbound request, unmodified.
    pub fn request(&self) -> &InvocationRequest {
        &self.request
    }

    pub fn bot_id(&self) -> Option<&str> {
        self.request.bot_id.as_deref()
    }

    pub fn platform_version(&self) -> &str {
        self.request
            .platform_version
            .as_deref()
            .unwrap_or(DEFAULT_PLATFORM_VERSION)
    }

    /// Name of the variable the dialog state operates on.
    pub fn state(&self) -> Option<&str> {
        self.request.state.as_deref()
    }

    /// Component properties merged with caller extensions.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    // ================================================================
    // Variables
    // ================================================================

    /// Reads a variable's value.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.context.variables.get(name).map(|v| &v.value)
    }

    /// Reads a variable including its type.
    pub fn variable_entry(&self, name: &str) -> Option<&Variable> {
        self.context.variables.get(name)
    }

    pub fn variable_entry_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.context.variables.get_mut(name)
    }

    /// Writes a variable's value, keeping its declared type. Unknown
    /// variables are created untyped.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.set_typed_variable(name, &CompositeBagType::default(), value);
    }

    /// Writes a variable's value, declaring it with `var_type` if it does
    /// not exist yet.
    pub fn set_typed_variable(&mut self, name: &str, var_type: &CompositeBagType, value: Value) {
        match self.context.variables.get_mut(name) {
            Some(var) => var.value = value,
            None => {
                self.context
                    .variables
                    .insert(name.to_string(), Variable::new(var_type.clone(), value));
            }
        }
    }

    // ================================================================
    // Resolution status
    // ================================================================

    /// Reads the resolution status stored under `status_variable`.
    ///
    /// Returns `Ok(None)` when the variable is absent or null.
    pub fn entity_status(&self, status_variable: &str) -> ContextResult<Option<ResolutionStatus>> {
        match self.variable(status_variable) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => serde_json::from_value(raw.clone())
                .map(Some)
                .map_err(|source| ContextError::MalformedStatus {
                    variable: status_variable.to_string(),
                    source,
                }),
        }
    }

    /// Writes the resolution status back into `status_variable`.
    pub fn set_entity_status(&mut self, status_variable: &str, status: &ResolutionStatus) {
        // ResolutionStatus only holds JSON-safe types; to_value cannot fail.
        let value = serde_json::to_value(status).unwrap_or(Value::Null);
        self.set_variable(status_variable, value);
    }

    // ================================================================
    // Messages & turn control
    // ================================================================

    /// Queues an outbound message addressed to the inbound conversation.
    pub fn add_message(&mut self, payload: Value) {
        let inbound = &self.request.message;
        self.messages.push(MessageEnvelope::new(
            inbound.tenant_id.clone(),
            inbound.channel_conversation.clone(),
            payload,
        ));
    }

    /// Queues a message and keeps the turn.
    pub fn reply(&mut self, payload: Value) {
        self.add_message(payload);
        self.keep_turn(true);
    }

    pub fn messages(&self) -> &[MessageEnvelope] {
        &self.messages
    }

    /// Signals whether the component keeps conversational control after
    /// this turn (`true`) or yields it (`false`).
    pub fn keep_turn(&mut self, keep: bool) {
        self.keep_turn = keep;
    }

    pub fn keeps_turn(&self) -> bool {
        self.keep_turn
    }

    /// Requests a dialog transition, optionally naming the action to take.
    pub fn transition(&mut self, action: Option<&str>) {
        self.transition = true;
        self.action = action.map(str::to_string);
    }

    /// Snapshot of the response as it stands now.
    pub fn response(&self) -> ResponseSnapshot {
        ResponseSnapshot {
            platform_version: self.platform_version().to_string(),
            context: self.context.clone(),
            messages: self.messages.clone(),
            keep_turn: self.keep_turn,
            transition: self.transition,
            action: self.action.clone(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use crate::request::ConversationContext;
use parley_model::MessageEnvelope;
use serde::{Deserialize, Serialize};

/// The response a completed invocation resolves with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSnapshot {
    pub platform_version: String,
    pub context: ConversationContext,
    #[serde(default)]
    pub messages: Vec<MessageEnvelope>,
    #[serde(default)]
    pub keep_turn: bool,
    #[serde(default)]
    pub transition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One outbound message, addressed back to the conversation it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub channel_conversation: Value,
    #[serde(default)]
    pub message_payload: Value,
}

impl MessageEnvelope {
    pub fn new(tenant_id: Option<String>, channel_conversation: Value, message_payload: Value) -> Self {
        Self {
            tenant_id,
            channel_conversation,
            message_payload,
        }
    }
}

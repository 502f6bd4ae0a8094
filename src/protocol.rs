//! Wire types for the chat endpoint.
//!
//! Request: `{"conversation":[{"role":"user","text":"..."}]}`.
//! Response: `{"result":"..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the user.
    User,
}

/// One role-tagged utterance in the request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    /// Build a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub conversation: Vec<ConversationTurn>,
}

impl ChatRequest {
    /// A request carrying a single user turn.
    pub fn single_turn(text: impl Into<String>) -> Self {
        Self {
            conversation: vec![ConversationTurn::user(text)],
        }
    }
}

/// Decoded success body.
///
/// Only a non-empty string `result` counts as a reply. Any other shape
/// (missing field, `null`, empty string, number, non-object body) is
/// "no response".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResponse {
    pub result: Option<String>,
}

impl ChatResponse {
    /// A response with a reply.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            result: Some(text.into()),
        }
    }

    /// Extract the reply from an arbitrary JSON body.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let result = value
            .get("result")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        Self { result }
    }

    /// Parse a raw body. Fails only when the bytes are not JSON.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }
}

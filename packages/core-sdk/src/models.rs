use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationErrors;

/**
 * \brief Message in the OpenAI-compatible chat layout shared by both providers.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /** \brief Role: system/user/assistant, or whatever the caller's history carried */
    pub role: String,
    /** \brief Content, never absent on the wire */
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/**
 * \brief Validated inbound chat request.
 *
 * History entries are kept as raw JSON so they can be echoed back untouched.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /** \brief New user message, never blank */
    pub message: String,
    /** \brief Caller-supplied history in conversation order */
    pub history: Vec<Value>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Value>) -> Self {
        self.history = history;
        self
    }

    /**
     * \brief Validates a decoded JSON body: `message` required string, `history` nullable array or keyed object.
     */
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let message = match body.get("message") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::Array(items)) if items.is_empty() => None,
            Some(other) => Some(other),
        };
        let message = match message {
            None => {
                errors.add("message", "The message field is required.");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                errors.add("message", "The message field must be a string.");
                None
            }
        };

        let history = match body.get("history") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            // A keyed object counts as an array; its values are taken in order.
            Some(Value::Object(entries)) => entries.values().cloned().collect(),
            Some(_) => {
                errors.add("history", "The history field must be an array.");
                Vec::new()
            }
        };

        match message {
            Some(message) if errors.is_empty() => Ok(Self { message, history }),
            _ => Err(errors),
        }
    }
}

/**
 * \brief Successful relay result, serialized as the 200 response body.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResult {
    /** \brief Assistant reply */
    pub message: String,
    /** \brief Original history followed by the new user and assistant turns */
    pub history: Vec<Value>,
}

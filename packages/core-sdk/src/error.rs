use serde_json::{json, Map, Value};
use thiserror::Error;

pub const PROVIDER_ERROR_MESSAGE: &str = "Failed to get response from AI.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/**
 * \brief Field-level validation failures in the order the rules were checked.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self
                .fields
                .push((field.to_string(), vec![message.into()])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /**
     * \brief Summary line: the first message, plus a count of the rest.
     */
    pub fn summary(&self) -> String {
        let mut all = self.fields.iter().flat_map(|(_, messages)| messages);
        let Some(first) = all.next() else {
            return "The given data was invalid.".to_string();
        };
        match all.count() {
            0 => first.clone(),
            1 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n),
        }
    }

    fn to_json(&self) -> Value {
        let errors: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, messages)| (name.clone(), json!(messages)))
            .collect();
        json!({
            "message": self.summary(),
            "errors": errors,
        })
    }
}

/**
 * \brief Every way a relay call can fail. Each variant maps to one status and body.
 */
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{}", .0.summary())]
    Validation(ValidationErrors),

    #[error("{0}")]
    Configuration(String),

    #[error("provider responded with status {status}")]
    Provider { status: u16, details: Value },

    #[error("{0}")]
    Unexpected(String),
}

impl ChatError {
    /**
     * \brief Builds an `Unexpected` error from a fault and its source chain.
     */
    pub fn unexpected(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        ChatError::Unexpected(message)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::Validation(_) | ChatError::Configuration(_) => 422,
            ChatError::Provider { .. } | ChatError::Unexpected(_) => 500,
        }
    }

    /**
     * \brief JSON body returned to the caller.
     */
    pub fn body(&self) -> Value {
        match self {
            ChatError::Validation(errors) => errors.to_json(),
            ChatError::Configuration(message) => json!({ "error": message }),
            ChatError::Provider { details, .. } => json!({
                "error": PROVIDER_ERROR_MESSAGE,
                "details": details,
            }),
            ChatError::Unexpected(message) => json!({
                "error": UNEXPECTED_ERROR_MESSAGE,
                "exception": message,
            }),
        }
    }
}

impl From<ValidationErrors> for ChatError {
    fn from(errors: ValidationErrors) -> Self {
        ChatError::Validation(errors)
    }
}

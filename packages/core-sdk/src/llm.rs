use std::{str::FromStr, sync::Arc};

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::{
    config::{ProviderConfig, RelayConfig, COHERE_KEY_PLACEHOLDER},
    error::ChatError,
    models::{ChatMessage, ChatRequest, ChatResult},
    prompt,
};

pub const NO_RESPONSE: &str = "No response generated.";
const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f64 = 0.7;
const COHERE_KEY_MISSING: &str =
    "Cohere API Key is missing. Please set COHERE_API_KEY in your .env file.";

/**
 * \brief Upstream provider flavours. Each one owns its headers, body shape and reply path.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /** \brief OpenAI-compatible router (Hugging Face) */
    OpenAiCompatible,
    /** \brief Cohere v2 chat API */
    CohereV2,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hugging-face" | "huggingface" | "hf" | "openai" | "chat" => {
                Ok(ProviderKind::OpenAiCompatible)
            }
            "cohere" | "chat-v2" => Ok(ProviderKind::CohereV2),
            other => Err(anyhow!("unknown provider: {}", other)),
        }
    }
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::OpenAiCompatible => "hugging-face",
            ProviderKind::CohereV2 => "cohere",
        }
    }

    pub fn config(self, config: &RelayConfig) -> &ProviderConfig {
        match self {
            ProviderKind::OpenAiCompatible => &config.hugging_face,
            ProviderKind::CohereV2 => &config.cohere,
        }
    }

    /**
     * \brief Rejects calls that cannot succeed before touching the network.
     */
    fn check_credentials(self, provider: &ProviderConfig) -> Result<(), ChatError> {
        match self {
            ProviderKind::OpenAiCompatible => Ok(()),
            ProviderKind::CohereV2 => {
                if !provider.has_key() || provider.api_key == COHERE_KEY_PLACEHOLDER {
                    Err(ChatError::Configuration(COHERE_KEY_MISSING.to_string()))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn headers(self, provider: &ProviderConfig) -> Result<HeaderMap, ChatError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", provider.api_key))
            .map_err(|err| ChatError::unexpected(&err))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self == ProviderKind::CohereV2 {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }

    pub fn request_body(self, model: &str, messages: &[ChatMessage]) -> Value {
        match self {
            ProviderKind::OpenAiCompatible => json!({
                "model": model,
                "messages": messages,
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }),
            ProviderKind::CohereV2 => json!({
                "model": model,
                "messages": messages,
            }),
        }
    }

    /**
     * \brief Pulls the reply text out of a response body, defaulting when the path is absent.
     */
    pub fn extract_reply(self, v: &Value) -> String {
        let reply = match self {
            ProviderKind::OpenAiCompatible => extract_openai_content(v),
            ProviderKind::CohereV2 => extract_cohere_content(v),
        };
        reply.unwrap_or(NO_RESPONSE).to_string()
    }
}

/**
 * \brief Relay pipeline shared by both routes: prompt, assemble, call, extract.
 */
#[derive(Clone)]
pub struct ChatRelay {
    client: reqwest::Client,
    config: Arc<RelayConfig>,
}

impl ChatRelay {
    pub fn new(config: RelayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /**
     * \brief Runs one chat turn against the given provider.
     */
    pub async fn chat(
        &self,
        kind: ProviderKind,
        request: ChatRequest,
    ) -> Result<ChatResult, ChatError> {
        let provider = kind.config(&self.config);
        kind.check_credentials(provider)?;

        let system = prompt::system_prompt(&request.message);
        let messages = prompt::assemble_messages(&system, &request.history, &request.message);
        debug!(
            provider = kind.label(),
            model = %provider.model,
            msgs = messages.len(),
            "relaying chat request"
        );

        let reply = match self.call(kind, provider, &messages).await {
            Ok(reply) => reply,
            Err(err) => {
                if let ChatError::Unexpected(message) = &err {
                    error!(provider = kind.label(), message = %message, "chat exception");
                }
                return Err(err);
            }
        };

        let mut history = request.history;
        history.push(json!(ChatMessage::user(request.message)));
        history.push(json!(ChatMessage::assistant(reply.clone())));
        Ok(ChatResult {
            message: reply,
            history,
        })
    }

    async fn call(
        &self,
        kind: ProviderKind,
        provider: &ProviderConfig,
        messages: &[ChatMessage],
    ) -> Result<String, ChatError> {
        let body = kind.request_body(&provider.model, messages);
        let resp = self
            .client
            .post(provider.url.as_str())
            .headers(kind.headers(provider)?)
            .timeout(provider.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| ChatError::unexpected(&err))?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|err| ChatError::unexpected(&err))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            error!(
                provider = kind.label(),
                status = status.as_u16(),
                response = %text,
                "provider API error"
            );
            let details = match serde_json::from_slice::<Value>(&bytes) {
                Ok(v) if !v.is_null() => v,
                _ => Value::String(text),
            };
            return Err(ChatError::Provider {
                status: status.as_u16(),
                details,
            });
        }

        let v: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(kind.extract_reply(&v))
    }
}

fn extract_openai_content(v: &Value) -> Option<&str> {
    v.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
}

fn extract_cohere_content(v: &Value) -> Option<&str> {
    v.get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("text"))
        .and_then(|t| t.as_str())
}

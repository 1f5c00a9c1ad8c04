use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};

pub const DEFAULT_COHERE_URL: &str = "https://api.cohere.com/v2/chat";
pub const DEFAULT_COHERE_MODEL: &str = "command-r-plus";
pub const COHERE_KEY_PLACEHOLDER: &str = "YOUR_COHERE_API_KEY_HERE";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/**
 * \brief Credentials and endpoint for one upstream provider.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /** \brief API key or bearer token, empty when unset */
    pub api_key: String,
    /** \brief Full chat endpoint URL */
    pub url: String,
    /** \brief Model identifier sent in every request */
    pub model: String,
    /** \brief Upper bound on one outbound call */
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(
        api_key: impl Into<String>,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            url: url.into(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/**
 * \brief Log sink settings.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    /** \brief Extra file sink directory; stdout only when `None` */
    pub log_dir: Option<PathBuf>,
}

/**
 * \brief Process-wide configuration, built once at startup and never mutated.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /** \brief OpenAI-compatible router behind `/chat` */
    pub hugging_face: ProviderConfig,
    /** \brief Cohere v2 chat API behind `/chat-v2` */
    pub cohere: ProviderConfig,
    pub telemetry: TelemetryConfig,
}

impl RelayConfig {
    /**
     * \brief Reads configuration from the process environment.
     */
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /**
     * \brief Builds configuration from any key lookup; unset and empty values are treated alike.
     */
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let timeout = match get("STACKRELAY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid STACKRELAY_TIMEOUT_SECS: {raw}"))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        // The router has no defaults: an unset value is sent as-is.
        let hugging_face = ProviderConfig::new(
            get("HUGGING_FACE_API_TOKEN").unwrap_or_default(),
            get("HUGGING_FACE_URL").unwrap_or_default(),
            get("HUGGING_FACE_MODEL").unwrap_or_default(),
        )
        .with_timeout(timeout);

        let cohere = ProviderConfig::new(
            get("COHERE_API_KEY").unwrap_or_default(),
            get("COHERE_URL").unwrap_or_else(|| DEFAULT_COHERE_URL.to_string()),
            get("COHERE_MODEL").unwrap_or_else(|| DEFAULT_COHERE_MODEL.to_string()),
        )
        .with_timeout(timeout);

        Ok(Self {
            hugging_face,
            cohere,
            telemetry: TelemetryConfig {
                log_dir: get("STACKRELAY_LOG_DIR").map(PathBuf::from),
            },
        })
    }
}

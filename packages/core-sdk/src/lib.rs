pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod server;
pub mod telemetry;

/**
 * \brief SDK prelude, re-exporting the modules callers use most.
 */
pub mod prelude {
    pub use crate::config::{ProviderConfig, RelayConfig};
    pub use crate::error::ChatError;
    pub use crate::llm::{ChatRelay, ProviderKind};
    pub use crate::models::{ChatMessage, ChatRequest, ChatResult};
    pub use crate::server;
    pub use crate::telemetry;
}

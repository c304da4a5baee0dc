//! solquiz-providers — LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI and Anthropic, plus a mock
//! used by tests and dry runs.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, SolquizConfig};
pub use error::ProviderError;

//! # agent-runtime
//!
//! Reasoning engine providers for the web research agent.
//!
//! ## Providers
//!
//! - **Ollama** (default): local inference via Ollama's streaming chat API
//!   with native tool calling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::ollama::{OllamaConfig, OllamaProvider};
//!
//! let provider = OllamaProvider::from_config(OllamaConfig::from_env()?)?;
//! let session = SessionBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

pub use agent_core::{AgentError, LlmProvider, Result};

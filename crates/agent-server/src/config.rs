//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).
//! Missing credentials or malformed numbers stop the process before it binds.

use anyhow::{Context, bail};

use agent_core::Verbosity;
use agent_runtime::OllamaConfig;
use web_research::{ProfileOptions, TavilyConfig};

const DEFAULT_MODEL: &str = "llama3.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_STREAMS: usize = 10;
const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub tavily: TavilyConfig,
    pub ollama: OllamaConfig,
    pub research_model: String,
    pub formatter_model: String,
    pub bind_addr: String,
    /// Ceiling on simultaneously open streaming responses
    pub max_concurrent_streams: usize,
    pub verbosity: Verbosity,
    pub max_iterations: usize,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let tavily = TavilyConfig::from_env().context("search provider configuration")?;
        let ollama = OllamaConfig::from_env().context("reasoning engine configuration")?;
        Self::from_lookup(tavily, ollama, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        tavily: TavilyConfig,
        ollama: OllamaConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let research_model = var("RESEARCH_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let formatter_model = var("FORMATTER_MODEL").unwrap_or_else(|| research_model.clone());

        let bind_addr = match var("BIND_ADDR") {
            Some(addr) => addr,
            None => {
                let port = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
                format!("0.0.0.0:{port}")
            }
        };

        let max_concurrent_streams =
            parse_or(var("MAX_CONCURRENT_STREAMS"), "MAX_CONCURRENT_STREAMS", DEFAULT_MAX_STREAMS)?;
        if max_concurrent_streams == 0 {
            bail!("MAX_CONCURRENT_STREAMS must be at least 1");
        }

        let max_iterations = parse_or(var("MAX_ITERATIONS"), "MAX_ITERATIONS", DEFAULT_MAX_ITERATIONS)?;
        if max_iterations == 0 {
            bail!("MAX_ITERATIONS must be at least 1");
        }

        Ok(Self {
            tavily,
            ollama,
            research_model,
            formatter_model,
            bind_addr,
            max_concurrent_streams,
            verbosity: var("STREAM_DEBUG").map_or(Verbosity::Quiet, |v| Verbosity::from_flag(&v)),
            max_iterations,
        })
    }

    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            model: self.research_model.clone(),
            formatter_model: self.formatter_model.clone(),
            max_iterations: self.max_iterations,
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

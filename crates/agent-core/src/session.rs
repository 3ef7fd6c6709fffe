//! Agent Sessions
//!
//! An `AgentSession` binds a system prompt and an ordered tool set once and
//! can then serve any number of concurrent queries. Every call starts a fresh
//! conversation; the session itself holds no per-query state.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use crate::error::{AgentError, Result};
use crate::event::{Lifecycle, RawEvent, RawEventStream};
use crate::message::Role;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::reasoning::ReasoningLoop;
use crate::tool::{Tool, ToolRegistry, ToolSchema};

/// Capacity of the channel between the reasoning task and its consumer
const EVENT_BUFFER: usize = 32;

/// Session configuration
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Session name, used in logs
    pub name: String,

    /// System prompt
    pub system_prompt: String,

    /// Maximum model turns per query
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "agent".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Use the available tools when they help you answer accurately. Be concise.";

/// A reusable binding of prompt, tools and model
pub struct AgentSession {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    schemas: Arc<[ToolSchema]>,
    config: SessionConfig,
}

impl AgentSession {
    /// Create a new session
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        config: SessionConfig,
    ) -> Self {
        let schemas = tools.schemas().into();
        Self {
            provider,
            tools: Arc::new(tools),
            schemas,
            config,
        }
    }

    /// Start a query and return its raw event stream.
    ///
    /// The reasoning loop runs on its own task. Dropping the stream makes the
    /// task stop at its next event.
    pub fn stream(&self, query: &str) -> RawEventStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let reasoning = ReasoningLoop {
            provider: self.provider.clone(),
            tools: self.tools.clone(),
            schemas: self.schemas.clone(),
            config: self.config.clone(),
            events: tx,
        };

        let span = tracing::info_span!("agent_query", session = %self.config.name);
        tokio::spawn(reasoning.drive(query.to_string()).instrument(span));

        Box::pin(ReceiverStream::new(rx))
    }

    /// Run a query to completion and return the final answer text
    pub async fn run(&self, query: &str) -> Result<String> {
        let mut events = self.stream(query);
        let mut answer = String::new();

        while let Some(event) = events.next().await {
            match event? {
                RawEvent::Message(message) if message.role == Role::Assistant => {
                    answer = message.text_content();
                }
                RawEvent::Lifecycle(Lifecycle::Completed { .. }) => return Ok(answer),
                _ => {}
            }
        }

        Err(AgentError::StreamClosed)
    }

    /// The tools bound to this session
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Builder for agent sessions
#[derive(Default)]
pub struct SessionBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Vec<Arc<dyn Tool>>,
    config: SessionConfig,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn shared_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Validate the tool set and build the session
    pub fn build(self) -> Result<AgentSession> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;
        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }
        let tools = ToolRegistry::from_tools(self.tools)?;

        Ok(AgentSession::new(provider, tools, self.config))
    }
}

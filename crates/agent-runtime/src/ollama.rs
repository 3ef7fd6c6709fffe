//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference. Turns are
//! streamed from `/api/chat` as newline-delimited JSON with native tool
//! calling; model listing and health checks go through `ollama-rs`.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{ContentBlock, Message, Role},
    provider::{CompletionStream, GenerationOptions, LlmProvider, ModelInfo, StreamChunk, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use ollama_rs::Ollama;
use serde::Deserialize;
use serde_json::{Value, json};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Request timeout in seconds, covering the whole streamed turn
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 300,
        }
    }
}

impl OllamaConfig {
    /// Read `OLLAMA_HOST` / `OLLAMA_PORT`; a malformed port is an error
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("OLLAMA_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AgentError::Config(format!("OLLAMA_PORT has an invalid value {raw:?}: {e}")))?,
            None => defaults.port,
        };

        Ok(Self {
            host: var("OLLAMA_HOST").unwrap_or(defaults.host),
            port,
            ..defaults
        })
    }

    fn chat_url(&self) -> String {
        format!("{}:{}/api/chat", self.host.trim_end_matches('/'), self.port)
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client: Ollama::new(&config.host, config.port),
            http,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OllamaConfig::from_env()?)
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Convert agent messages to Ollama chat messages.
    ///
    /// A tool message carrying several results becomes one `tool` message
    /// per result, in order.
    fn convert_messages(messages: &[Message]) -> Vec<Value> {
        let mut out = Vec::with_capacity(messages.len());

        for message in messages {
            match message.role {
                Role::System | Role::User => out.push(json!({
                    "role": message.role.to_string(),
                    "content": message.text_content(),
                })),
                Role::Assistant => {
                    let mut turn = json!({
                        "role": "assistant",
                        "content": message.text_content(),
                    });
                    let calls: Vec<Value> = message
                        .tool_calls()
                        .map(|call| {
                            json!({
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments,
                                }
                            })
                        })
                        .collect();
                    if !calls.is_empty() {
                        turn["tool_calls"] = Value::Array(calls);
                    }
                    out.push(turn);
                }
                Role::Tool => {
                    for block in &message.content {
                        match block {
                            ContentBlock::ToolResult(result) => out.push(json!({
                                "role": "tool",
                                "content": result.output,
                                "tool_name": result.name,
                            })),
                            ContentBlock::Text(text) => out.push(json!({
                                "role": "tool",
                                "content": text,
                            })),
                            ContentBlock::ToolUse(_) => {}
                        }
                    }
                }
            }
        }

        out
    }

    /// Advertise tools in Ollama's function-calling format
    fn convert_tools(tools: &[ToolSchema]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters_json_schema(),
                    }
                })
            })
            .collect()
    }

    fn chat_request(messages: &[Message], tools: &[ToolSchema], options: &GenerationOptions) -> Value {
        let mut body = json!({
            "model": options.model,
            "messages": Self::convert_messages(messages),
            "stream": true,
            "options": {
                "temperature": options.temperature,
                "top_p": options.top_p,
                "num_predict": options.max_tokens,
            },
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(Self::convert_tools(tools));
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<CompletionStream> {
        let body = Self::chat_request(messages, tools, options);

        tracing::debug!(model = %options.model, messages = messages.len(), tools = tools.len(), "Ollama chat request");

        let response = self
            .http
            .post(self.config.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!(
                "Ollama returned {status}: {}",
                detail.trim()
            )));
        }

        Ok(parse_chat_stream(response.bytes_stream()))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
            })
            .collect())
    }
}

/// One line of the `/api/chat` stream
#[derive(Debug, Deserialize)]
struct ChatLine {
    #[serde(default)]
    message: Option<ChatLineMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatLineMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl From<WireToolCall> for ToolCall {
    fn from(wire: WireToolCall) -> Self {
        // Some models send arguments as a JSON-encoded string
        let arguments = match wire.function.arguments {
            Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::Null),
            other => other,
        };
        let call = Self::new(wire.function.name, arguments);
        match wire.id {
            Some(id) => call.with_id(id),
            None => call,
        }
    }
}

impl ChatLine {
    fn into_chunk(self) -> Result<StreamChunk> {
        if let Some(error) = self.error {
            return Err(AgentError::Provider(error));
        }

        let (delta, tool_calls) = self.message.map_or_else(
            || (String::new(), Vec::new()),
            |m| (m.content, m.tool_calls.into_iter().map(ToolCall::from).collect()),
        );
        let usage = self.done.then(|| {
            let prompt_tokens = self.prompt_eval_count.unwrap_or(0);
            let completion_tokens = self.eval_count.unwrap_or(0);
            TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }
        });

        Ok(StreamChunk {
            delta,
            tool_calls,
            done: self.done,
            usage,
        })
    }
}

struct NdjsonState<S> {
    bytes: Pin<Box<S>>,
    buffer: Vec<u8>,
    finished: bool,
}

impl<S> NdjsonState<S> {
    /// Next complete line in the buffer, or the trailing remainder once the
    /// source is exhausted
    fn next_line(&mut self, flush: bool) -> Option<String> {
        loop {
            let line = match self.buffer.iter().position(|b| *b == b'\n') {
                Some(end) => {
                    let line: Vec<u8> = self.buffer.drain(..=end).collect();
                    String::from_utf8_lossy(&line).trim().to_string()
                }
                None if flush && !self.buffer.is_empty() => {
                    let line = std::mem::take(&mut self.buffer);
                    String::from_utf8_lossy(&line).trim().to_string()
                }
                None => return None,
            };
            if !line.is_empty() {
                return Some(line);
            }
        }
    }
}

fn parse_line(line: &str) -> Result<StreamChunk> {
    serde_json::from_str::<ChatLine>(line)
        .map_err(|e| AgentError::Parse(format!("Invalid Ollama stream line: {e}")))?
        .into_chunk()
}

/// Parse an NDJSON byte stream into completion chunks.
///
/// The stream ends after the first error or after a line marked `done`.
fn parse_chat_stream<S, B, E>(bytes: S) -> CompletionStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    Box::pin(futures::stream::unfold(
        NdjsonState {
            bytes: Box::pin(bytes),
            buffer: Vec::new(),
            finished: false,
        },
        |mut state| async move {
            if state.finished {
                return None;
            }

            loop {
                if let Some(line) = state.next_line(false) {
                    let chunk = parse_line(&line);
                    state.finished = chunk.as_ref().map_or(true, |c| c.done);
                    return Some((chunk, state));
                }

                match state.bytes.next().await {
                    Some(Ok(bytes)) => state.buffer.extend_from_slice(bytes.as_ref()),
                    Some(Err(e)) => {
                        state.finished = true;
                        return Some((Err(AgentError::Provider(format!("Ollama stream interrupted: {e}"))), state));
                    }
                    None => {
                        state.finished = true;
                        let line = state.next_line(true)?;
                        let chunk = parse_line(&line);
                        return Some((chunk, state));
                    }
                }
            }
        },
    ))
}

//! Scripted Provider
//!
//! Deterministic `LlmProvider` for tests and offline demos. Each call to
//! `complete_stream` consumes the next scripted turn.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{CompletionStream, GenerationOptions, LlmProvider, ModelInfo, StreamChunk};
use crate::tool::{ToolCall, ToolSchema};

#[derive(Clone, Debug)]
enum Step {
    Text(String),
    ToolUse(ToolCall),
    Fail(String),
}

/// One scripted model turn
#[derive(Clone, Debug, Default)]
pub struct ScriptedTurn {
    steps: Vec<Step>,
    refusal: Option<String>,
}

impl ScriptedTurn {
    /// A turn that streams `text`
    pub fn text(text: impl Into<String>) -> Self {
        Self::default().then_text(text)
    }

    /// A turn that requests one tool
    pub fn tool(name: &str, arguments: serde_json::Value) -> Self {
        Self::default().then_tool(name, arguments)
    }

    /// A turn whose request fails before any chunk is produced
    pub fn refused(error: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            refusal: Some(error.into()),
        }
    }

    #[must_use]
    pub fn then_text(mut self, text: impl Into<String>) -> Self {
        self.steps.push(Step::Text(text.into()));
        self
    }

    #[must_use]
    pub fn then_tool(mut self, name: &str, arguments: serde_json::Value) -> Self {
        self.steps.push(Step::ToolUse(ToolCall::new(name, arguments)));
        self
    }

    /// Fail the stream after the preceding steps
    #[must_use]
    pub fn then_fail(mut self, error: impl Into<String>) -> Self {
        self.steps.push(Step::Fail(error.into()));
        self
    }
}

/// A request observed by the scripted provider
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<String>,
    pub model: String,
}

/// Provider that replays scripted turns in order
#[derive(Default)]
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<CompletionStream> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                messages: messages.to_vec(),
                tools: tools.iter().map(|t| t.name.clone()).collect(),
                model: options.model.clone(),
            });

        let turn = self
            .turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| AgentError::Provider("script exhausted".into()))?;

        if let Some(error) = turn.refusal {
            return Err(AgentError::Provider(error));
        }

        let mut items = Vec::with_capacity(turn.steps.len() + 1);
        let mut failed = false;
        for step in turn.steps {
            items.push(match step {
                Step::Text(text) => Ok(StreamChunk::text(text)),
                Step::ToolUse(call) => Ok(StreamChunk::tool_use(call)),
                Step::Fail(error) => {
                    failed = true;
                    Err(AgentError::Provider(error))
                }
            });
            if failed {
                break;
            }
        }
        if !failed {
            items.push(Ok(StreamChunk::done()));
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
        }])
    }
}

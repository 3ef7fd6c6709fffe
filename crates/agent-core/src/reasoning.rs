//! Reasoning Loop
//!
//! Drives one query through repeated model turns. Each turn streams text,
//! may request tools, and has every requested tool answered before the next
//! turn is requested. Everything observable is written to the event channel.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{AgentError, Result};
use crate::event::{Lifecycle, RawEvent};
use crate::message::{Conversation, Message};
use crate::provider::LlmProvider;
use crate::session::SessionConfig;
use crate::tool::{ToolCall, ToolRegistry, ToolResult, ToolSchema};

/// Per-query loop state; owned by the producer task
pub(crate) struct ReasoningLoop {
    pub(crate) provider: Arc<dyn LlmProvider>,
    pub(crate) tools: Arc<ToolRegistry>,
    pub(crate) schemas: Arc<[ToolSchema]>,
    pub(crate) config: SessionConfig,
    pub(crate) events: mpsc::Sender<Result<RawEvent>>,
}

impl ReasoningLoop {
    /// Run to completion, reporting a failure as the final event
    pub(crate) async fn drive(self, query: String) {
        match self.run_turns(query).await {
            Ok(()) => {}
            Err(AgentError::StreamClosed) => {
                tracing::debug!("Event receiver dropped, abandoning query");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Reasoning loop failed");
                // The receiver may be gone as well; nothing left to tell.
                let _ = self.events.send(Err(err)).await;
            }
        }
    }

    async fn run_turns(&self, query: String) -> Result<()> {
        let mut conversation = Conversation::with_system_prompt(self.config.system_prompt.clone());
        conversation.push(Message::user(query));

        for iteration in 1..=self.config.max_iterations {
            self.emit(RawEvent::Lifecycle(Lifecycle::TurnStarted { iteration }))
                .await?;

            let turn = self.model_turn(&conversation).await?;
            let calls: Vec<ToolCall> = turn.tool_calls().cloned().collect();
            conversation.push(turn.clone());
            self.emit(RawEvent::Message(turn)).await?;

            if calls.is_empty() {
                tracing::debug!(iteration, "Model finished without tool use");
                return self
                    .emit(RawEvent::Lifecycle(Lifecycle::Completed {
                        iterations: iteration,
                    }))
                    .await;
            }

            let results = futures::future::join_all(calls.iter().map(|c| self.execute_tool(c))).await;
            let answers = Message::tool_results(results);
            conversation.push(answers.clone());
            self.emit(RawEvent::Message(answers)).await?;
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Stream one model turn, forwarding text deltas as they arrive
    async fn model_turn(&self, conversation: &Conversation) -> Result<Message> {
        let mut stream = self
            .provider
            .complete_stream(conversation.messages(), &self.schemas, &self.config.generation)
            .await?;

        let mut text = String::new();
        let mut calls = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.delta.is_empty() {
                text.push_str(&chunk.delta);
                self.emit(RawEvent::Data(chunk.delta)).await?;
            }
            calls.extend(chunk.tool_calls);
            if chunk.done {
                break;
            }
        }

        for call in &mut calls {
            if call.id.is_none() {
                call.id = Some(uuid::Uuid::new_v4().to_string());
            }
        }

        Ok(Message::assistant_turn(text, calls))
    }

    /// Execute a tool call; always yields exactly one result
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        tracing::debug!(tool = %call.name, id = ?call.id, "Executing tool");

        match self.tools.execute(call).await {
            Ok(result) => result.with_id(call.id.clone()),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call rejected");
                ToolResult::failure(call.name.clone(), format!("Error: {e}")).with_id(call.id.clone())
            }
        }
    }

    async fn emit(&self, event: RawEvent) -> Result<()> {
        self.events
            .send(Ok(event))
            .await
            .map_err(|_| AgentError::StreamClosed)
    }
}

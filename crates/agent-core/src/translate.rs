//! Stream Translator
//!
//! Maps raw session events onto client-facing output events. Text that was
//! already relayed as deltas is not repeated when the turn's message closes.
//! A failure from the source ends the output with a single `StreamError`.

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::{Lifecycle, OutputEvent, OutputStream, RawEvent};
use crate::message::{ContentBlock, Message, Role};
use crate::text::floor_char_boundary;

/// Longest diagnostic relayed to a client
const DIAGNOSTIC_LIMIT: usize = 200;

/// How much internal detail reaches the client
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Answer text, tool notices and errors only
    #[default]
    Quiet,
    /// Also relay diagnostics for every other event
    Debug,
}

impl Verbosity {
    /// Parse a flag such as `on`, `true`, `1`, `debug`
    pub fn from_flag(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "on" | "true" | "yes" | "debug" => Self::Debug,
            _ => Self::Quiet,
        }
    }
}

/// Stateful event classifier
#[derive(Debug, Default)]
pub struct StreamTranslator {
    verbosity: Verbosity,
    turn_streamed: bool,
}

impl StreamTranslator {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            turn_streamed: false,
        }
    }

    /// Classify a single raw event
    pub fn translate_event(&mut self, event: RawEvent) -> Vec<OutputEvent> {
        match event {
            RawEvent::Data(text) => {
                if text.is_empty() {
                    return Vec::new();
                }
                self.turn_streamed = true;
                vec![OutputEvent::TextChunk(text)]
            }
            RawEvent::Message(message) if message.role == Role::Assistant => {
                let streamed = std::mem::take(&mut self.turn_streamed);
                self.assistant_message(message, streamed)
            }
            RawEvent::Message(message) => self.diagnostic(|| describe_message(&message)),
            RawEvent::Lifecycle(lifecycle) => {
                if matches!(lifecycle, Lifecycle::TurnStarted { .. }) {
                    self.turn_streamed = false;
                }
                self.diagnostic(|| describe_lifecycle(&lifecycle))
            }
        }
    }

    fn assistant_message(&self, message: Message, streamed: bool) -> Vec<OutputEvent> {
        let mut out = Vec::with_capacity(message.content.len());
        for block in message.content {
            match block {
                ContentBlock::Text(text) if !streamed && !text.is_empty() => {
                    out.push(OutputEvent::TextChunk(text));
                }
                ContentBlock::Text(_) => {}
                ContentBlock::ToolUse(call) => {
                    let arguments = (self.verbosity == Verbosity::Debug)
                        .then(|| serde_json::to_string(&call.arguments).unwrap_or_default());
                    out.push(OutputEvent::ToolNotice(call.name));
                    if let Some(arguments) = arguments {
                        out.push(OutputEvent::Diagnostic(truncate(format!(
                            "tool arguments: {arguments}"
                        ))));
                    }
                }
                ContentBlock::ToolResult(result) => {
                    out.extend(self.diagnostic(|| format!("unexpected tool result from {}", result.name)));
                }
            }
        }
        out
    }

    fn diagnostic(&self, describe: impl FnOnce() -> String) -> Vec<OutputEvent> {
        match self.verbosity {
            Verbosity::Quiet => Vec::new(),
            Verbosity::Debug => vec![OutputEvent::Diagnostic(truncate(describe()))],
        }
    }

    /// Translate a whole raw stream
    pub fn translate<S>(self, source: S) -> OutputStream
    where
        S: Stream<Item = Result<RawEvent>> + Send + 'static,
    {
        let mut translator = self;
        Box::pin(async_stream::stream! {
            let mut source = Box::pin(source);
            while let Some(item) = source.next().await {
                match item {
                    Ok(event) => {
                        for out in translator.translate_event(event) {
                            yield out;
                        }
                    }
                    Err(err) => {
                        yield OutputEvent::StreamError(err.to_string());
                        break;
                    }
                }
            }
        })
    }
}

fn describe_message(message: &Message) -> String {
    if message.role == Role::Tool {
        let outcomes: Vec<String> = message
            .tool_outputs()
            .map(|r| format!("{} ({})", r.name, if r.success { "ok" } else { "failed" }))
            .collect();
        format!("tool results: {}", outcomes.join(", "))
    } else {
        format!("{} message with {} blocks", message.role, message.content.len())
    }
}

fn describe_lifecycle(lifecycle: &Lifecycle) -> String {
    match lifecycle {
        Lifecycle::TurnStarted { iteration } => format!("turn {iteration} started"),
        Lifecycle::Completed { iterations } => format!("completed after {iterations} turns"),
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > DIAGNOSTIC_LIMIT {
        text.truncate(floor_char_boundary(&text, DIAGNOSTIC_LIMIT));
        text.push_str("...");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::tool::{ToolCall, ToolResult};
    use serde_json::json;

    fn text(t: &str) -> RawEvent {
        RawEvent::Message(Message::assistant(t))
    }

    fn tool_use(name: &str) -> RawEvent {
        RawEvent::Message(Message::assistant_turn("", vec![ToolCall::new(name, json!({"query": "q"}))]))
    }

    async fn run(events: Vec<Result<RawEvent>>, verbosity: Verbosity) -> Vec<OutputEvent> {
        StreamTranslator::new(verbosity)
            .translate(futures::stream::iter(events))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_preserves_order() {
        let out = run(
            vec![Ok(text("A")), Ok(tool_use("search")), Ok(text("B"))],
            Verbosity::Quiet,
        )
        .await;

        assert_eq!(
            out,
            vec![
                OutputEvent::TextChunk("A".into()),
                OutputEvent::ToolNotice("search".into()),
                OutputEvent::TextChunk("B".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_terminates_stream() {
        let out = run(
            vec![
                Ok(text("A")),
                Err(AgentError::Provider("boom".into())),
                Ok(text("never")),
                Err(AgentError::Provider("again".into())),
            ],
            Verbosity::Quiet,
        )
        .await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], OutputEvent::TextChunk("A".into()));
        assert_eq!(out[1], OutputEvent::StreamError("Provider error: boom".into()));
    }

    #[tokio::test]
    async fn test_streamed_text_not_repeated() {
        let turn = Message::assistant_turn(
            "Hello world",
            vec![ToolCall::new("web_search", json!({}))],
        );
        let out = run(
            vec![
                Ok(RawEvent::Lifecycle(Lifecycle::TurnStarted { iteration: 1 })),
                Ok(RawEvent::Data("Hello ".into())),
                Ok(RawEvent::Data("world".into())),
                Ok(RawEvent::Message(turn)),
                Ok(text("Unstreamed")),
            ],
            Verbosity::Quiet,
        )
        .await;

        assert_eq!(
            out,
            vec![
                OutputEvent::TextChunk("Hello ".into()),
                OutputEvent::TextChunk("world".into()),
                OutputEvent::ToolNotice("web_search".into()),
                OutputEvent::TextChunk("Unstreamed".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_other_events_quiet_by_default() {
        let results = Message::tool_results(vec![ToolResult::success("web_search", "hits")]);
        let out = run(
            vec![
                Ok(RawEvent::Lifecycle(Lifecycle::TurnStarted { iteration: 1 })),
                Ok(RawEvent::Message(results)),
                Ok(RawEvent::Message(Message::user("hi"))),
                Ok(RawEvent::Lifecycle(Lifecycle::Completed { iterations: 1 })),
            ],
            Verbosity::Quiet,
        )
        .await;

        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_debug_relays_diagnostics() {
        let results = Message::tool_results(vec![ToolResult::failure("web_crawl", "timeout")]);
        let out = run(
            vec![
                Ok(RawEvent::Lifecycle(Lifecycle::TurnStarted { iteration: 1 })),
                Ok(tool_use("web_crawl")),
                Ok(RawEvent::Message(results)),
            ],
            Verbosity::Debug,
        )
        .await;

        assert_eq!(out[0], OutputEvent::Diagnostic("turn 1 started".into()));
        assert_eq!(out[1], OutputEvent::ToolNotice("web_crawl".into()));
        assert!(matches!(&out[2], OutputEvent::Diagnostic(d) if d.contains("\"query\"")));
        assert_eq!(out[3], OutputEvent::Diagnostic("tool results: web_crawl (failed)".into()));
    }

    #[test]
    fn test_diagnostics_are_truncated() {
        let long = "é".repeat(300);
        let cut = truncate(long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= DIAGNOSTIC_LIMIT + 3);
    }

    #[test]
    fn test_verbosity_flag() {
        assert_eq!(Verbosity::from_flag("ON"), Verbosity::Debug);
        assert_eq!(Verbosity::from_flag("1"), Verbosity::Debug);
        assert_eq!(Verbosity::from_flag("off"), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flag(""), Verbosity::Quiet);
    }
}

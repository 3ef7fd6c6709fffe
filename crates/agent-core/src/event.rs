//! Stream Events
//!
//! `RawEvent` is what the reasoning loop produces; `OutputEvent` is what the
//! transport relays to a client. The translator maps one onto the other.

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;
use crate::message::Message;

/// Loop bookkeeping with no client-facing content
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Lifecycle {
    /// A new model turn is about to be requested
    TurnStarted { iteration: usize },
    /// The model ended a turn without requesting tools
    Completed { iterations: usize },
}

/// Unprocessed event from an agent session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEvent {
    /// Incremental text produced within the current turn
    Data(String),
    /// A completed message: the model's turn, or tool results fed back to it
    Message(Message),
    /// Turn boundaries
    Lifecycle(Lifecycle),
}

/// Stream of raw events for one query
pub type RawEventStream = Pin<Box<dyn Stream<Item = Result<RawEvent>> + Send>>;

/// Normalized, transport-ready event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum OutputEvent {
    /// Answer text
    TextChunk(String),
    /// The model is invoking the named tool
    ToolNotice(String),
    /// Terminal failure; nothing follows it
    StreamError(String),
    /// Internal detail, only produced when debug verbosity is enabled
    Diagnostic(String),
}

/// Stream of output events for one query
pub type OutputStream = Pin<Box<dyn Stream<Item = OutputEvent> + Send>>;

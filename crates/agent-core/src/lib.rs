//! # agent-core
//!
//! Core agent logic: a provider-agnostic LLM abstraction, a tool registry, and
//! a streaming tool-orchestration loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         AgentSession                             │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────────────┐     │
//! │  │  Reasoning  │───│    Tool     │   │    LlmProvider      │     │
//! │  │    Loop     │───│  Registry   │   │    (Strategy)       │     │
//! │  └──────┬──────┘   └─────────────┘   └─────────────────────┘     │
//! └─────────┼────────────────────────────────────────────────────────┘
//!           │ mpsc<RawEvent>
//!   ┌───────▼──────────┐
//!   │ StreamTranslator │──▶ OutputEvent (text, tool notice, error)
//!   └──────────────────┘
//! ```

pub mod error;
pub mod event;
pub mod message;
pub mod mock;
pub mod provider;
mod reasoning;
pub mod session;
pub mod text;
pub mod tool;
pub mod translate;

pub use error::{AgentError, Result};
pub use event::{Lifecycle, OutputEvent, OutputStream, RawEvent, RawEventStream};
pub use message::{ContentBlock, Message, Role};
pub use provider::LlmProvider;
pub use session::{AgentSession, SessionBuilder};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
pub use translate::{StreamTranslator, Verbosity};

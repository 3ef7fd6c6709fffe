//! Application State

use std::sync::Arc;

use tokio::sync::Semaphore;

use agent_core::{AgentSession, Verbosity};
use web_research::Profile;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Short-answer session
    pub simple: Arc<AgentSession>,

    /// Multi-step research session
    pub deep: Arc<AgentSession>,

    /// One permit per open streaming response
    pub stream_slots: Arc<Semaphore>,

    /// Whether diagnostics reach clients
    pub verbosity: Verbosity,
}

impl AppState {
    pub fn new(
        simple: AgentSession,
        deep: AgentSession,
        max_concurrent_streams: usize,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            simple: Arc::new(simple),
            deep: Arc::new(deep),
            stream_slots: Arc::new(Semaphore::new(max_concurrent_streams)),
            verbosity,
        }
    }

    pub fn session(&self, profile: Profile) -> &AgentSession {
        match profile {
            Profile::Simple => &self.simple,
            Profile::Deep => &self.deep,
        }
    }
}

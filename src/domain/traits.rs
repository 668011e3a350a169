//! # Domain Traits
//!
//! Abstract interfaces for the collaborators of the command core (chat, backend, search).
//! Allows for pluggable implementations in the Infrastructure layer and fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::domain::command::Command;

/// Abstract interface for a Chat Provider (e.g., Matrix)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Post a message, into `thread_id` when it is not empty
    async fn post(&self, message: &str, thread_id: &str) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Performs the side effect behind a command and describes the outcome.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Never returns an empty string.
    async fn execute(&self, command: &Command) -> String;
}

/// Outcome of a single call to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub success: bool,
    pub description: String,
}

/// Client for the PullRequestService.
#[async_trait]
pub trait PullRequestService: Send + Sync {
    async fn start(&self) -> BackendStatus;
    async fn stop(&self) -> BackendStatus;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub timestamp: DateTime<Local>,
    pub summary: String,
}

/// Lookup over previously seen chat messages.
pub trait Searcher: Send + Sync {
    fn find(&self, terms: &[String]) -> Vec<SearchHit>;
}

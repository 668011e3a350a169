//! # Command Executor
//!
//! Performs the side effect behind each `(type, target)` pair and describes the outcome as plain text.
//! Every failure is folded into the returned string since the only consumer is a chat message.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::application::search::format_hit;
use crate::domain::command::{Command, CommandTarget, CommandType};
use crate::domain::traits::{Executor, PullRequestService, Searcher};
use crate::infrastructure::fortune;
use crate::strings::{logs, messages};

pub struct CommandExecutor {
    pr_service: Arc<dyn PullRequestService>,
    searcher: Arc<dyn Searcher>,
    started_at: Instant,
}

impl CommandExecutor {
    pub fn new(pr_service: Arc<dyn PullRequestService>, searcher: Arc<dyn Searcher>) -> Self {
        Self {
            pr_service,
            searcher,
            started_at: Instant::now(),
        }
    }

    async fn start_pull_requests(&self) -> String {
        tracing::info!("{}", logs::STARTING_PR_SERVICE);
        let status = self.pr_service.start().await;
        if status.success {
            tracing::info!("{}", messages::PR_STARTED);
            messages::PR_STARTED.to_string()
        } else {
            let msg = messages::pr_start_failed(&status.description);
            tracing::warn!("{}", msg);
            msg
        }
    }

    async fn stop_pull_requests(&self) -> String {
        tracing::info!("{}", logs::STOPPING_PR_SERVICE);
        let status = self.pr_service.stop().await;
        if status.success {
            tracing::info!("{}", messages::PR_STOPPED);
            messages::PR_STOPPED.to_string()
        } else {
            let msg = messages::pr_stop_failed(&status.description);
            tracing::warn!("{}", msg);
            msg
        }
    }

    fn self_status(&self) -> String {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let (workers, tasks) = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let metrics = handle.metrics();
                (metrics.num_workers(), metrics.num_alive_tasks())
            }
            Err(_) => (0, 0),
        };
        messages::self_status(workers, tasks, cpus, self.started_at.elapsed().as_secs())
    }

    fn search(&self, terms: &[String]) -> String {
        if terms.is_empty() {
            return messages::SEARCH_USAGE.to_string();
        }
        let hits = self.searcher.find(terms);
        if hits.is_empty() {
            return messages::no_search_results(&terms.join(" "));
        }
        hits.iter().map(format_hit).collect::<Vec<_>>().join("\n")
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    async fn execute(&self, command: &Command) -> String {
        match (command.kind, command.target) {
            (CommandType::Start, CommandTarget::PullRequests) => self.start_pull_requests().await,
            (CommandType::Stop, CommandTarget::PullRequests) => self.stop_pull_requests().await,
            (CommandType::Status, CommandTarget::SelfStatus) => {
                tracing::info!("{}", logs::REPORTING_SELF_STATUS);
                self.self_status()
            }
            (CommandType::Search, _) => self.search(&command.trailing),
            (CommandType::Fortune, _) => fortune::tell().await,
            (kind, target) => {
                let msg = messages::not_handled(kind, target);
                tracing::info!("{}", msg);
                msg
            }
        }
    }
}

//! # Command Dispatcher
//!
//! Runs every command in its own task, races it against a timeout ceiling and publishes
//! exactly one [`CommandResult`] per command on the outbound queue.
//!
//! A command that outlives the ceiling is not cancelled. It is abandoned: its one-shot
//! result slot stays writable, so the late outcome lands there and is dropped.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc, oneshot};

use crate::domain::command::{Command, CommandResult};
use crate::domain::traits::Executor;
use crate::strings::{logs, messages};

pub struct Dispatcher {
    executor: Arc<dyn Executor>,
    timeout: Duration,
    /// Admission limit on concurrent executions. `None` is unbounded.
    permits: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    pub fn new(executor: Arc<dyn Executor>, timeout: Duration) -> Self {
        Self {
            executor,
            timeout,
            permits: None,
        }
    }

    pub fn with_max_in_flight(mut self, limit: Option<usize>) -> Self {
        self.permits = limit.map(|n| Arc::new(Semaphore::new(n.max(1))));
        self
    }

    /// Reads commands until the inbound queue is closed.
    ///
    /// The loop never waits on an execution; each command gets its own task right away.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<Command>,
        results: mpsc::Sender<CommandResult>,
    ) {
        tracing::info!("{}", logs::dispatcher_started(self.timeout.as_secs()));
        while let Some(command) = commands.recv().await {
            tracing::info!(
                "{}",
                logs::command_received(&command.kind, &command.target, &command.thread_id)
            );
            tokio::spawn(dispatch(
                self.executor.clone(),
                self.permits.clone(),
                self.timeout,
                command,
                results.clone(),
            ));
        }
        tracing::info!("{}", logs::DISPATCHER_STOPPED);
    }
}

/// Coordinates a single command: Received -> Executing -> Completed | TimedOut.
async fn dispatch(
    executor: Arc<dyn Executor>,
    permits: Option<Arc<Semaphore>>,
    ceiling: Duration,
    command: Command,
    results: mpsc::Sender<CommandResult>,
) {
    let thread_id = command.thread_id.clone();
    let outcome = tokio::time::timeout(ceiling, run_isolated(executor, permits, command)).await;

    let result = match outcome {
        Ok(message) => CommandResult::new(message, thread_id),
        Err(_) => {
            tracing::warn!("{}", logs::command_timed_out(&thread_id, ceiling.as_secs()));
            CommandResult::new(messages::timed_out(ceiling.as_secs()), thread_id)
        }
    };

    if let Err(e) = results.send(result).await {
        tracing::error!("{}", logs::result_queue_closed(&e.0.thread_id));
    }
}

/// Spawns the execution into its own task and waits on its result slot.
///
/// If this future is dropped by the timeout, the spawned task keeps running and its
/// write into the slot fails without blocking.
async fn run_isolated(
    executor: Arc<dyn Executor>,
    permits: Option<Arc<Semaphore>>,
    command: Command,
) -> String {
    let permit = match permits {
        Some(semaphore) => match semaphore.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => return messages::EXECUTION_FAILED.to_string(),
        },
        None => None,
    };

    let (slot, outcome) = oneshot::channel::<String>();
    tokio::spawn(async move {
        // Held until the execution finishes, even when abandoned.
        let _permit = permit;
        let message = match AssertUnwindSafe(executor.execute(&command))
            .catch_unwind()
            .await
        {
            Ok(message) if message.is_empty() => messages::EMPTY_OUTCOME.to_string(),
            Ok(message) => message,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::error!("{}", logs::execution_panicked(&command.thread_id, &reason));
                messages::EXECUTION_FAILED.to_string()
            }
        };
        if let Err(late) = slot.send(message) {
            tracing::debug!("{}", logs::late_result_discarded(&command.thread_id, &late));
        }
    });

    outcome
        .await
        .unwrap_or_else(|_| messages::EXECUTION_FAILED.to_string())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! # Outbox
//!
//! Drains the result queue and posts each result to the chat, into its thread when it has one.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::domain::command::CommandResult;
use crate::domain::traits::ChatProvider;
use crate::strings::logs;

/// Posts results until every sender of the queue is gone.
pub async fn deliver(mut results: mpsc::Receiver<CommandResult>, chat: Arc<dyn ChatProvider>) {
    while let Some(result) = results.recv().await {
        if let Err(e) = chat.post(&result.message, &result.thread_id).await {
            tracing::error!(
                "{}",
                logs::post_failed(&chat.room_id(), &result.thread_id, &e)
            );
        }
    }
    tracing::info!("{}", logs::OUTBOX_CLOSED);
}

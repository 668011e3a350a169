//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes command parsing, routing, execution, dispatching and result delivery.

pub mod dispatcher;
pub mod executor;
pub mod logging;
pub mod outbox;
pub mod parsing;
pub mod router;
pub mod search;

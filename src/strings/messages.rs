//! # Messages
//!
//! Contains constant strings and format functions for chat replies.

use crate::domain::command::{CommandTarget, CommandType};

pub const GREETING: &str = "Hello, I am ready to accept commands";
pub const UNKNOWN_COMMAND: &str = "❓ I don't know this command.";

pub const PR_STARTED: &str = "Successfully started processing pull requests";
pub const PR_STOPPED: &str = "Successfully stopped processing pull requests";

pub fn pr_start_failed(status: &str) -> String {
    format!("Failed to start processing pull requests: {status}")
}

pub fn pr_stop_failed(status: &str) -> String {
    format!("Failed to stop processing pull requests: {status}")
}

pub fn not_handled(kind: CommandType, target: CommandTarget) -> String {
    format!("The command '{kind} {target}' is not handled")
}

pub fn self_status(workers: usize, tasks: usize, cpus: usize, uptime_secs: u64) -> String {
    format!(
        "I am chugging along, thanks for asking.\n\n# of Workers: {workers}\n# of Tasks: {tasks}\n# of CPU: {cpus}\nUptime: {uptime_secs}s"
    )
}

pub const SEARCH_USAGE: &str = "Usage: `@<bot> search <terms>`";

pub fn no_search_results(terms: &str) -> String {
    format!("No results for '{terms}'")
}

pub const NO_COOKIE: &str = "No cookie for you!";

pub fn code_block(content: &str) -> String {
    format!("```\n{content}\n```")
}

pub fn timed_out(secs: u64) -> String {
    format!("The operation took more than {secs} seconds and timed out, sorry :(")
}

pub const EXECUTION_FAILED: &str = "❌ Something went wrong while running that command.";
pub const EMPTY_OUTCOME: &str = "Done, but there was nothing to report.";

//! # Fortune
//!
//! Shells out to `fortune` and `cowsay`. Missing binaries degrade to a plainer answer.

use std::io;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::strings::messages;

/// Ceiling for each child process. A hung child is killed instead of holding on to
/// its execution slot.
const CHILD_LIMIT: Duration = Duration::from_secs(10);

pub async fn tell() -> String {
    tracing::info!("I will handle the 'fortune' command");

    let cookie = match run_with_limit(Command::new("fortune"), CHILD_LIMIT).await {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim_end().to_string()
        }
        Ok(output) => {
            tracing::warn!("fortune exited with {}", output.status);
            return messages::NO_COOKIE.to_string();
        }
        Err(e) => {
            tracing::warn!("fortune is not available: {}", e);
            return messages::NO_COOKIE.to_string();
        }
    };
    if cookie.is_empty() {
        return messages::NO_COOKIE.to_string();
    }

    let mut cowsay = Command::new("cowsay");
    cowsay.arg(&cookie);
    match run_with_limit(cowsay, CHILD_LIMIT).await {
        Ok(output) if output.status.success() => {
            messages::code_block(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(_) => cookie,
        Err(e) => {
            tracing::debug!("cowsay is not available: {}", e);
            cookie
        }
    }
}

/// Runs `command` to completion, killing it once `limit` has passed.
async fn run_with_limit(mut command: Command, limit: Duration) -> io::Result<Output> {
    command.kill_on_drop(true);
    match timeout(limit, command.output()).await {
        Ok(output) => output,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no answer within {}ms", limit.as_millis()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_always_has_an_answer() {
        assert!(!tell().await.is_empty());
    }

    #[tokio::test]
    async fn test_hung_child_is_cut_off() {
        let mut sleep = Command::new("sleep");
        sleep.arg("30");

        let started = Instant::now();
        let err = run_with_limit(sleep, Duration::from_millis(100))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_quick_child_finishes() {
        let mut echo = Command::new("echo");
        echo.arg("moo");

        let output = run_with_limit(echo, Duration::from_secs(5)).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "moo");
    }
}

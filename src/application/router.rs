//! # Message Router
//!
//! Routes incoming chat messages: messages not addressed to the bot are dropped, unrecognized
//! directives are answered right away, and everything else goes to the dispatcher's inbound queue.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::parsing::parse_command;
use crate::application::search::MessageIndex;
use crate::domain::command::{Command, CommandResult};
use crate::strings::{logs, messages};

/// A chat message as delivered by the chat collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub body: String,
    /// Empty when the message is not part of a thread.
    pub thread_id: String,
}

impl InboundMessage {
    pub fn new(body: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            thread_id: thread_id.into(),
        }
    }
}

/// What the router decided to do with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Not addressed to the bot, or empty.
    Ignore,
    /// Addressed to the bot but not understood.
    Reply(CommandResult),
    Dispatch(Command),
}

pub struct MessageRouter {
    mention: String,
    /// Full `localpart:server` id of the bot account, also accepted as a mention.
    user_id: Option<String>,
    commands: mpsc::Sender<Command>,
    results: mpsc::Sender<CommandResult>,
    index: Option<Arc<MessageIndex>>,
}

impl MessageRouter {
    pub fn new(
        mention: &str,
        commands: mpsc::Sender<Command>,
        results: mpsc::Sender<CommandResult>,
    ) -> Self {
        Self {
            mention: mention.trim_start_matches('@').to_lowercase(),
            user_id: None,
            commands,
            results,
            index: None,
        }
    }

    /// Also answer to `@localpart:server` of the bot account.
    pub fn with_user_id(mut self, user_id: &str) -> Self {
        let user_id = user_id.trim_start_matches('@').to_lowercase();
        self.user_id = user_id.contains(':').then_some(user_id);
        self
    }

    /// Feed every routed message into `index` for the search command.
    pub fn with_index(mut self, index: Arc<MessageIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn classify(&self, message: &InboundMessage) -> Routing {
        let command = match parse_command(&message.body, &message.thread_id) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!("{}", logs::message_dropped(&e.to_string()));
                return Routing::Ignore;
            }
        };

        if !self.is_addressed(&command) {
            return Routing::Ignore;
        }

        if !command.is_recognized() {
            tracing::info!("{}", logs::unrecognized_command(&message.body));
            return Routing::Reply(CommandResult::new(
                messages::UNKNOWN_COMMAND,
                message.thread_id.clone(),
            ));
        }

        Routing::Dispatch(command)
    }

    fn is_addressed(&self, command: &Command) -> bool {
        command.addresses(&self.mention)
            || self
                .user_id
                .as_deref()
                .is_some_and(|id| command.addresses(id))
    }

    pub async fn route(&self, message: &InboundMessage) -> Result<()> {
        let routing = self.classify(message);

        // Directives to the bot are not worth searching for.
        if let (Some(index), Routing::Ignore) = (&self.index, &routing) {
            index.index(&message.body);
        }

        match routing {
            Routing::Ignore => Ok(()),
            Routing::Reply(result) => self
                .results
                .send(result)
                .await
                .context(logs::RESULT_QUEUE_CLOSED),
            Routing::Dispatch(command) => self
                .commands
                .send(command)
                .await
                .context(logs::COMMAND_QUEUE_CLOSED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::{CommandTarget, CommandType};
    use crate::domain::traits::Searcher;

    fn router() -> (
        MessageRouter,
        mpsc::Receiver<Command>,
        mpsc::Receiver<CommandResult>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (res_tx, res_rx) = mpsc::channel(8);
        (MessageRouter::new("MtFlow", cmd_tx, res_tx), cmd_rx, res_rx)
    }

    #[test]
    fn test_unmentioned_messages_are_ignored() {
        let (router, _, _) = router();
        for text in [
            "please give me the status of pr",
            "@someone start pr",
            "mtflow start pr",
            "@mtflowbot start pr",
        ] {
            assert_eq!(router.classify(&InboundMessage::new(text, "t")), Routing::Ignore);
        }
    }

    #[test]
    fn test_empty_messages_are_ignored() {
        let (router, _, _) = router();
        assert_eq!(router.classify(&InboundMessage::new("  !! ", "")), Routing::Ignore);
    }

    #[test]
    fn test_mention_is_case_insensitive_and_positionless() {
        let (router, _, _) = router();
        let routing = router.classify(&InboundMessage::new("start pr, @MTFLOW!", "t9"));
        match routing {
            Routing::Dispatch(cmd) => {
                assert_eq!(cmd.kind, CommandType::Start);
                assert_eq!(cmd.target, CommandTarget::PullRequests);
                assert_eq!(cmd.thread_id, "t9");
            }
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    #[test]
    fn test_full_user_id_is_a_mention() {
        let (router, _, _) = router();
        let router = router.with_user_id("@MtFlow:Example.org");

        let routing = router.classify(&InboundMessage::new("@mtflow:example.org, start pr", "t"));
        assert!(matches!(routing, Routing::Dispatch(cmd) if cmd.kind == CommandType::Start));

        let routing = router.classify(&InboundMessage::new("@mtflow:elsewhere.org start pr", "t"));
        assert_eq!(routing, Routing::Ignore);
    }

    #[test]
    fn test_full_user_id_needs_a_configured_account() {
        let (router, _, _) = router();
        let routing = router.classify(&InboundMessage::new("@mtflow:example.org start pr", "t"));
        assert_eq!(routing, Routing::Ignore);
    }

    #[test]
    fn test_unknown_verb_is_answered() {
        let (router, _, _) = router();
        let routing = router.classify(&InboundMessage::new("@mtflow dance", "t1"));
        assert_eq!(
            routing,
            Routing::Reply(CommandResult::new(messages::UNKNOWN_COMMAND, "t1"))
        );
    }

    #[test]
    fn test_missing_target_is_answered() {
        let (router, _, _) = router();
        let routing = router.classify(&InboundMessage::new("@mtflow stop it", ""));
        assert_eq!(
            routing,
            Routing::Reply(CommandResult::new(messages::UNKNOWN_COMMAND, ""))
        );
    }

    #[test]
    fn test_target_less_commands_are_dispatched() {
        let (router, _, _) = router();
        let routing = router.classify(&InboundMessage::new("@mtflow fortune", ""));
        assert!(matches!(routing, Routing::Dispatch(cmd) if cmd.kind == CommandType::Fortune));
    }

    #[tokio::test]
    async fn test_route_forwards_to_the_right_queue() {
        let (router, mut commands, mut results) = router();

        router
            .route(&InboundMessage::new("@mtflow status mtflow", "a"))
            .await
            .unwrap();
        router
            .route(&InboundMessage::new("@mtflow what?", "b"))
            .await
            .unwrap();
        router
            .route(&InboundMessage::new("just chatting", "c"))
            .await
            .unwrap();

        let cmd = commands.try_recv().unwrap();
        assert_eq!(cmd.thread_id, "a");
        assert!(commands.try_recv().is_err());

        let result = results.try_recv().unwrap();
        assert_eq!(result.thread_id, "b");
        assert!(results.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_route_indexes_plain_chat() {
        let (router, _commands, _results) = router();
        let index = Arc::new(MessageIndex::new());
        let router = router.with_index(index.clone());

        router
            .route(&InboundMessage::new("release train leaves at noon", ""))
            .await
            .unwrap();
        router
            .route(&InboundMessage::new("@mtflow search release", ""))
            .await
            .unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.find(&["train".to_string()]).len(), 1);
    }

    #[tokio::test]
    async fn test_route_fails_when_dispatcher_is_gone() {
        let (router, commands, _results) = router();
        drop(commands);
        assert!(
            router
                .route(&InboundMessage::new("@mtflow start pr", ""))
                .await
                .is_err()
        );
    }
}

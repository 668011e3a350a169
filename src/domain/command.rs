//! # Command Model
//!
//! Typed representation of a chat directive and of the reply it produces.

use std::fmt;

/// Top level verb of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandType {
    /// Unrecognized verb. Never executable.
    #[default]
    None,
    Start,
    Stop,
    Status,
    Search,
    Fortune,
}

impl CommandType {
    /// Maps a single normalized token to a verb.
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "status" => Some(Self::Status),
            "search" => Some(Self::Search),
            "fortune" => Some(Self::Fortune),
            _ => None,
        }
    }

    /// Verbs that only make sense against a target.
    pub fn requires_target(self) -> bool {
        match self {
            Self::Start | Self::Stop | Self::Status => true,
            Self::None | Self::Search | Self::Fortune => false,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
            Self::Search => "search",
            Self::Fortune => "fortune",
        };
        f.write_str(name)
    }
}

/// Backend subsystem a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandTarget {
    #[default]
    None,
    /// The PullRequestService.
    PullRequests,
    /// The bot itself.
    SelfStatus,
}

impl CommandTarget {
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "pr" => Some(Self::PullRequests),
            "mtflow" | "self" => Some(Self::SelfStatus),
            _ => None,
        }
    }
}

impl fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::PullRequests => "pr",
            Self::SelfStatus => "mtflow",
        };
        f.write_str(name)
    }
}

/// A parsed chat directive. Built once by the parser, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub kind: CommandType,
    pub target: CommandTarget,
    /// `@name` tokens in order of appearance, lower-cased. Duplicates are kept.
    pub mentions: Vec<String>,
    /// Free-text arguments following the verb (search terms).
    pub trailing: Vec<String>,
    /// Thread the reply belongs to. Empty means the room at large.
    pub thread_id: String,
}

impl Command {
    /// Whether the command can be handed to the dispatcher.
    pub fn is_recognized(&self) -> bool {
        match self.kind {
            CommandType::None => false,
            kind if kind.requires_target() => self.target != CommandTarget::None,
            _ => true,
        }
    }

    /// Case-insensitive check for `@name` among the mentions. `name` may be a bare
    /// localpart or a full `localpart:server` id; each only matches itself.
    pub fn addresses(&self, name: &str) -> bool {
        let wanted = format!("@{}", name.trim_start_matches('@').to_lowercase());
        self.mentions.iter().any(|m| *m == wanted)
    }
}

/// Outcome of executing (or rejecting) a command, destined for a chat reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub message: String,
    pub thread_id: String,
}

impl CommandResult {
    pub fn new(message: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            thread_id: thread_id.into(),
        }
    }
}

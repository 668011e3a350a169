//! # Command Parsing
//!
//! Turns free-form chat text into a [`Command`].
//! Keywords are recognized wherever they appear in the message, so natural phrasing like
//! "please give me the status of pr" works without a grammar.

use thiserror::Error;

use crate::domain::command::{Command, CommandTarget, CommandType};

/// Symbols stripped from both ends of the message and of every token.
const TRIM_SYMBOLS: &[char] = &[
    ' ', '!', '#', '$', '%', '^', '&', '*', '(', ')', '~', '<', '>', '?', ',',
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("The command was empty")]
    EmptyCommand,
}

fn trim_symbols(s: &str) -> &str {
    s.trim_matches(TRIM_SYMBOLS)
}

/// Parses `text` into a command tagged with `thread_id`.
///
/// An unknown verb or target is not an error: the command comes back with
/// `CommandType::None` / `CommandTarget::None` and the caller decides what to do with it.
pub fn parse_command(text: &str, thread_id: &str) -> Result<Command, ParseError> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = trim_symbols(&lowered)
        .split_whitespace()
        .map(trim_symbols)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    let mut command = Command {
        thread_id: thread_id.to_string(),
        ..Default::default()
    };

    for token in tokens {
        if let Some(kind) = CommandType::from_keyword(token) {
            // First verb wins
            if command.kind == CommandType::None {
                command.kind = kind;
            }
            continue;
        }
        if let Some(target) = CommandTarget::from_keyword(token) {
            if command.target == CommandTarget::None {
                command.target = target;
            }
            continue;
        }
        if token.len() > 1 && token.starts_with('@') {
            command.mentions.push(token.to_string());
            continue;
        }
        if command.kind == CommandType::Search {
            command.trailing.push(token.to_string());
        }
    }

    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command() {
        assert_eq!(parse_command("    ", ""), Err(ParseError::EmptyCommand));
        assert_eq!(parse_command("", ""), Err(ParseError::EmptyCommand));
        assert_eq!(parse_command(" !!?, ", ""), Err(ParseError::EmptyCommand));
    }

    #[test]
    fn test_unrecognized_command() {
        let cmd = parse_command(" lsdjhfl rwiuhgirehg erhgiuerhg oehrgioerhg,!#$% ", "").unwrap();
        assert_eq!(cmd.kind, CommandType::None);
        assert_eq!(cmd.target, CommandTarget::None);
        assert!(cmd.mentions.is_empty());
    }

    #[test]
    fn test_command_type_and_target_anywhere() {
        let cmd = parse_command("   @nataren,    please    give me the status of pr   ", "").unwrap();
        assert_eq!(cmd.kind, CommandType::Status);
        assert_eq!(cmd.target, CommandTarget::PullRequests);
        assert_eq!(cmd.mentions, vec!["@nataren"]);
    }

    #[test]
    fn test_without_mention() {
        let cmd = parse_command("please give me the status of pr", "").unwrap();
        assert_eq!(cmd.kind, CommandType::Status);
        assert_eq!(cmd.target, CommandTarget::PullRequests);
        assert!(cmd.mentions.is_empty());
    }

    #[test]
    fn test_mentions_are_ordered_and_lowercased() {
        let cmd = parse_command("@Nataren  @yurig !@manuel! status of pr", "").unwrap();
        assert_eq!(cmd.mentions, vec!["@nataren", "@yurig", "@manuel"]);
        assert_eq!(cmd.kind, CommandType::Status);
        assert_eq!(cmd.target, CommandTarget::PullRequests);
    }

    #[test]
    fn test_mentions_keep_duplicates() {
        let cmd = parse_command("@bot @other @bot fortune", "").unwrap();
        assert_eq!(cmd.mentions, vec!["@bot", "@other", "@bot"]);
    }

    #[test]
    fn test_lone_at_sign_is_not_a_mention() {
        let cmd = parse_command("@ start pr", "").unwrap();
        assert!(cmd.mentions.is_empty());
        assert_eq!(cmd.kind, CommandType::Start);
    }

    #[test]
    fn test_first_verb_wins() {
        let cmd = parse_command("@bot stop then start pr", "").unwrap();
        assert_eq!(cmd.kind, CommandType::Stop);
        assert_eq!(cmd.target, CommandTarget::PullRequests);
    }

    #[test]
    fn test_first_target_wins() {
        let cmd = parse_command("status mtflow pr", "").unwrap();
        assert_eq!(cmd.target, CommandTarget::SelfStatus);
    }

    #[test]
    fn test_self_keyword_targets_the_bot() {
        let cmd = parse_command("@bot status self?", "").unwrap();
        assert_eq!(cmd.target, CommandTarget::SelfStatus);
    }

    #[test]
    fn test_punctuated_keywords() {
        let cmd = parse_command("@bot, START (pr)!", "").unwrap();
        assert_eq!(cmd.kind, CommandType::Start);
        assert_eq!(cmd.target, CommandTarget::PullRequests);
        assert_eq!(cmd.mentions, vec!["@bot"]);
    }

    #[test]
    fn test_search_collects_trailing_terms() {
        let cmd = parse_command("@bot search deploy @alice Failure logs", "t1").unwrap();
        assert_eq!(cmd.kind, CommandType::Search);
        assert_eq!(cmd.trailing, vec!["deploy", "failure", "logs"]);
        assert_eq!(cmd.mentions, vec!["@bot", "@alice"]);
    }

    #[test]
    fn test_words_before_search_are_not_terms() {
        let cmd = parse_command("hey @bot please search for builds", "").unwrap();
        assert_eq!(cmd.trailing, vec!["for", "builds"]);
    }

    #[test]
    fn test_non_search_commands_have_no_trailing() {
        let cmd = parse_command("@bot start pr right now", "").unwrap();
        assert!(cmd.trailing.is_empty());
    }

    #[test]
    fn test_thread_id_is_carried() {
        let cmd = parse_command("@bot fortune", "$thread:example.org").unwrap();
        assert_eq!(cmd.thread_id, "$thread:example.org");
        assert_eq!(cmd.kind, CommandType::Fortune);
        assert_eq!(cmd.target, CommandTarget::None);
    }

    #[test]
    fn test_parse_is_pure() {
        let text = "@Bot search Release Notes";
        assert_eq!(parse_command(text, "x"), parse_command(text, "x"));
    }
}

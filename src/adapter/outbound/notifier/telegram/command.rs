//! Telegram command parsing.

use crate::port::inbound::command::Command;

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    MissingArgument {
        command: &'static str,
        usage: &'static str,
    },
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::MissingArgument { usage, .. } => write!(f, "usage: {usage}"),
        }
    }
}

impl std::error::Error for CommandParseError {}

const SUBSCRIBE_USAGE: &str = "/subscribe <address> [name]";
const UNSUBSCRIBE_USAGE: &str = "/unsubscribe <address>";

/// Parse a Telegram message into a bot command.
pub fn parse_command(text: &str) -> Result<Command, CommandParseError> {
    let text = text.trim();
    let (raw_command, rest) = match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (text, ""),
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" | "/help" => Ok(Command::Help),
        "/myid" => Ok(Command::MyId),
        "/list" => Ok(Command::List),
        "/subscribe" => {
            let (address, name) = match rest.split_once(char::is_whitespace) {
                Some((address, name)) => (address, Some(name.trim())),
                None => (rest, None),
            };
            let address = required(address, "subscribe", SUBSCRIBE_USAGE)?;
            Ok(Command::Subscribe {
                address,
                name: name.filter(|n| !n.is_empty()).map(str::to_string),
            })
        }
        "/unsubscribe" => Ok(Command::Unsubscribe {
            address: required(first_word(rest), "unsubscribe", UNSUBSCRIBE_USAGE)?,
        }),
        "/authorize" => Ok(Command::Authorize {
            target: optional(first_word(rest)),
        }),
        "/deauthorize" => Ok(Command::Deauthorize {
            target: optional(first_word(rest)),
        }),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn required(
    value: &str,
    command: &'static str,
    usage: &'static str,
) -> Result<String, CommandParseError> {
    if value.is_empty() {
        Err(CommandParseError::MissingArgument { command, usage })
    } else {
        Ok(value.to_string())
    }
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("myid", "Show your chat ID"),
        ("subscribe", "Watch an address"),
        ("unsubscribe", "Stop watching an address"),
        ("list", "Show your subscriptions"),
        ("help", "Show all commands"),
    ]
}

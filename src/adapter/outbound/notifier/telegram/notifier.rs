//! Telegram message delivery and command handling.
//!
//! Provides the [`TelegramMessenger`] for sending notifications and the
//! long-lived [`run_command_listener`] loop that feeds inbound chat
//! commands to a [`CommandHandler`].

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, User};
use tracing::{debug, error, info, warn};

use crate::domain::RecipientId;
use crate::error::{Error, Result};
use crate::port::inbound::command::{command_help, CommandHandler};
use crate::port::outbound::notifier::Messenger;

use super::command::{bot_commands, parse_command, CommandParseError};

/// Telegram messenger that sends plain text to a chat.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Verify the bot token by asking Telegram who we are.
    ///
    /// # Errors
    /// Returns an error if the token is rejected or Telegram is unreachable.
    pub async fn verify(&self) -> Result<User> {
        let me = self.bot.get_me().await?;
        info!(username = %me.username(), "Telegram bot authorized");
        Ok(me.user)
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, recipient: RecipientId, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(recipient.get()), text)
            .await
            .map(|_| ())
            .map_err(Error::from)
    }
}

/// Reply for a message, or `None` when the message should be ignored.
///
/// Parse failures get a usage hint or the help text; plain chatter is
/// ignored.
pub fn parse_failure_reply(err: &CommandParseError) -> Option<String> {
    match err {
        CommandParseError::NotACommand => None,
        CommandParseError::MissingArgument { .. } => Some(err.to_string()),
        CommandParseError::UnknownCommand(_) => {
            Some(format!("Invalid command: {err}\n\n{}", command_help()))
        }
    }
}

/// Long-lived loop handling inbound Telegram commands.
///
/// Returns when the underlying update stream ends (e.g. on Ctrl-C).
pub async fn run_command_listener(bot: Bot, handler: Arc<dyn CommandHandler>) {
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let handler = Arc::clone(&handler);
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };
            let from = RecipientId::new(msg.chat.id.0);

            match parse_command(text) {
                Ok(command) => {
                    debug!(recipient = %from, ?command, "Handling command");
                    handler.handle(from, command).await;
                }
                Err(err) => {
                    if let Some(reply) = parse_failure_reply(&err) {
                        if let Err(e) = bot.send_message(msg.chat.id, reply).await {
                            error!(error = %e, "Failed to send Telegram command response");
                        }
                    }
                }
            }

            respond(())
        }
    })
    .await;

    warn!("Telegram command listener shutting down");
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> std::result::Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_ignored() {
        assert!(parse_failure_reply(&CommandParseError::NotACommand).is_none());
    }

    #[test]
    fn missing_argument_gets_usage() {
        let err = parse_command("/unsubscribe").unwrap_err();
        assert_eq!(
            parse_failure_reply(&err).unwrap(),
            "usage: /unsubscribe <address>"
        );
    }

    #[test]
    fn unknown_command_gets_help() {
        let err = parse_command("/status").unwrap_err();
        let reply = parse_failure_reply(&err).unwrap();
        assert!(reply.starts_with("Invalid command: unknown command `/status`"));
        assert!(reply.contains("/subscribe <address> [name]"));
    }
}

//! Chat command execution.
//!
//! Validates and applies commands against [`MonitorState`], replies to the
//! sender (and to third parties for authorization changes), and launches
//! the one-off initial status fetch for new subscriptions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::monitor::fetch_bounded;
use super::state::{MonitorState, SubscribeOutcome, UnsubscribeOutcome};
use crate::domain::render::{render_initial_status, Header};
use crate::domain::{AccountState, Address, RecipientId, Subscription};
use crate::port::inbound::command::{command_help, Command, CommandHandler};
use crate::port::outbound::exchange::SnapshotFetcher;
use crate::port::outbound::notifier::Messenger;

/// Rejections shown to the user. Nothing is mutated when one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("⛔ You are not authorized to subscribe. Ask the administrator to authorize chat ID {0}.")]
    NotAuthorized(RecipientId),

    #[error("⛔ Only the administrator can use this command.")]
    AdminOnly,

    #[error("❌ Invalid address format: {0}")]
    InvalidAddress(String),

    #[error("❌ Invalid chat ID: {0}")]
    InvalidRecipient(String),

    #[error("❌ The administrator cannot be deauthorized.")]
    CannotDeauthorizeAdmin,

    #[error("usage: {0}")]
    MissingArgument(&'static str),
}

/// Messages to send plus an optional initial fetch to launch.
#[derive(Debug, Default, PartialEq)]
pub struct Effects {
    pub replies: Vec<(RecipientId, String)>,
    pub initial_status: Option<Subscription>,
}

impl Effects {
    fn reply(to: RecipientId, text: impl Into<String>) -> Self {
        Self {
            replies: vec![(to, text.into())],
            initial_status: None,
        }
    }
}

/// Command surface shared by the chat listener and tests.
#[derive(Clone)]
pub struct Control {
    state: Arc<MonitorState>,
    fetcher: Arc<dyn SnapshotFetcher>,
    messenger: Arc<dyn Messenger>,
    fetch_timeout: Duration,
}

impl Control {
    #[must_use]
    pub fn new(
        state: Arc<MonitorState>,
        fetcher: Arc<dyn SnapshotFetcher>,
        messenger: Arc<dyn Messenger>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            state,
            fetcher,
            messenger,
            fetch_timeout,
        }
    }

    /// Apply a command and deliver its replies.
    ///
    /// Returns the handle of the initial status task when a subscription
    /// was created.
    pub async fn execute(&self, from: RecipientId, command: Command) -> Option<JoinHandle<()>> {
        let effects = match self.apply(from, command) {
            Ok(effects) => effects,
            Err(err) => {
                info!(recipient = %from, reason = %err, "Command rejected");
                Effects::reply(from, err.to_string())
            }
        };

        for (to, text) in &effects.replies {
            self.send(*to, text).await;
        }

        effects
            .initial_status
            .map(|subscription| self.spawn_initial_status(subscription))
    }

    /// Validate and apply a command to the shared state.
    ///
    /// Authorization is checked before any argument is validated.
    ///
    /// # Errors
    /// Returns a [`ControlError`] for unauthorized senders and invalid
    /// arguments.
    pub fn apply(&self, from: RecipientId, command: Command) -> Result<Effects, ControlError> {
        match command {
            Command::MyId => Ok(Effects::reply(from, format!("🆔 Your chat ID is: {from}"))),
            Command::Help => Ok(Effects::reply(from, command_help())),
            Command::List => Ok(Effects::reply(from, self.list(from))),
            Command::Subscribe { address, name } => self.subscribe(from, &address, name),
            Command::Unsubscribe { address } => self.unsubscribe(from, &address),
            Command::Authorize { target } => {
                let target = self.admin_target(from, target.as_deref(), "/authorize <chat_id>")?;
                self.authorize(from, target)
            }
            Command::Deauthorize { target } => {
                let target =
                    self.admin_target(from, target.as_deref(), "/deauthorize <chat_id>")?;
                self.deauthorize(from, target)
            }
        }
    }

    fn list(&self, from: RecipientId) -> String {
        let subscriptions = self.state.subscriptions_for(from);
        if subscriptions.is_empty() {
            return "You have no subscriptions.".to_string();
        }

        let mut msg = String::from("📋 Your subscriptions:\n\n");
        for (i, subscription) in subscriptions.iter().enumerate() {
            msg.push_str(&format!(
                "{}. {} - {}\n",
                i + 1,
                subscription.address.short(),
                subscription.name
            ));
        }
        msg
    }

    fn subscribe(
        &self,
        from: RecipientId,
        address: &str,
        name: Option<String>,
    ) -> Result<Effects, ControlError> {
        if !self.state.is_authorized(from) {
            return Err(ControlError::NotAuthorized(from));
        }
        let address = parse_address(address)?;
        let subscription = Subscription::new(from, address, name.unwrap_or_default());

        match self.state.subscribe(subscription.clone()) {
            SubscribeOutcome::AlreadySubscribed => Ok(Effects::reply(
                from,
                format!("ℹ️ Address {} is already subscribed.", subscription.address.short()),
            )),
            SubscribeOutcome::Created { first_for_address } => {
                info!(
                    recipient = %from,
                    address = %subscription.address,
                    first_for_address,
                    "Subscription created"
                );
                Ok(Effects {
                    replies: vec![(
                        from,
                        format!(
                            "✅ Subscribed to {} ({})",
                            subscription.address.short(),
                            subscription.name
                        ),
                    )],
                    initial_status: Some(subscription),
                })
            }
        }
    }

    fn unsubscribe(&self, from: RecipientId, address: &str) -> Result<Effects, ControlError> {
        let address = parse_address(address)?;

        let text = match self.state.unsubscribe(from, &address) {
            UnsubscribeOutcome::NotSubscribed => {
                format!("ℹ️ Address {} is not subscribed.", address.short())
            }
            UnsubscribeOutcome::Removed { address_released } => {
                info!(recipient = %from, address = %address, address_released, "Subscription removed");
                format!("✅ Unsubscribed from {}", address.short())
            }
        };
        Ok(Effects::reply(from, text))
    }

    fn authorize(&self, from: RecipientId, target: RecipientId) -> Result<Effects, ControlError> {
        if !self.state.authorize(target) {
            return Ok(Effects::reply(
                from,
                format!("ℹ️ Chat {target} is already authorized."),
            ));
        }

        info!(recipient = %target, "Recipient authorized");
        Ok(Effects {
            replies: notify_pair(
                target,
                "✅ You have been authorized to subscribe to addresses.",
                self.state.super_admin(),
                format!("✅ Authorized chat {target}"),
            ),
            initial_status: None,
        })
    }

    fn deauthorize(&self, from: RecipientId, target: RecipientId) -> Result<Effects, ControlError> {
        if self.state.is_super_admin(target) {
            return Err(ControlError::CannotDeauthorizeAdmin);
        }

        if !self.state.deauthorize(target) {
            return Ok(Effects::reply(
                from,
                format!("ℹ️ Chat {target} is not authorized."),
            ));
        }

        info!(recipient = %target, "Recipient deauthorized");
        Ok(Effects {
            replies: notify_pair(
                target,
                "❌ Your authorization has been revoked by the administrator.",
                self.state.super_admin(),
                format!("✅ Deauthorized chat {target}"),
            ),
            initial_status: None,
        })
    }

    fn admin_target(
        &self,
        from: RecipientId,
        target: Option<&str>,
        usage: &'static str,
    ) -> Result<RecipientId, ControlError> {
        if !self.state.is_super_admin(from) {
            return Err(ControlError::AdminOnly);
        }
        let target = target.ok_or(ControlError::MissingArgument(usage))?;
        target
            .parse::<RecipientId>()
            .map_err(|_| ControlError::InvalidRecipient(target.to_string()))
    }

    /// Fetch once and send the full snapshot to the new subscriber only.
    fn spawn_initial_status(&self, subscription: Subscription) -> JoinHandle<()> {
        let control = self.clone();
        tokio::spawn(async move { control.send_initial_status(subscription).await })
    }

    async fn send_initial_status(&self, subscription: Subscription) {
        let Subscription {
            recipient,
            address,
            name,
        } = subscription;

        let snapshot =
            match fetch_bounded(self.fetcher.as_ref(), &address, self.fetch_timeout).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(address = %address, error = %e, "Initial fetch failed");
                    self.send(recipient, &initial_fetch_failed(&address, &e.to_string()))
                        .await;
                    return;
                }
            };

        let header = Header::new(&name, &address, Utc::now());
        self.send(recipient, &render_initial_status(&header, &snapshot))
            .await;

        if self
            .state
            .establish_baseline(recipient, &address, AccountState::from(snapshot))
        {
            info!(address = %address, "Baseline established from initial fetch");
        }
    }

    async fn send(&self, to: RecipientId, text: &str) {
        if let Err(e) = self.messenger.send_text(to, text).await {
            warn!(recipient = %to, error = %e, "Failed to send message");
        }
    }
}

#[async_trait]
impl CommandHandler for Control {
    async fn handle(&self, from: RecipientId, command: Command) {
        // The initial status task runs detached.
        let _ = self.execute(from, command).await;
    }
}

fn parse_address(raw: &str) -> Result<Address, ControlError> {
    Address::parse(raw).map_err(|_| ControlError::InvalidAddress(raw.to_string()))
}

fn initial_fetch_failed(address: &Address, reason: &str) -> String {
    format!(
        "⚠️ Failed to fetch the initial status of {}: {reason}",
        address.short()
    )
}

/// Message the target, and the super-admin unless they are the same chat.
fn notify_pair(
    target: RecipientId,
    target_text: &str,
    admin: RecipientId,
    admin_text: String,
) -> Vec<(RecipientId, String)> {
    let mut replies = vec![(target, target_text.to_string())];
    if admin != target {
        replies.push((admin, admin_text));
    }
    replies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::address;
    use crate::testkit::exchange::ScriptedFetcher;
    use crate::testkit::notifier::RecordingMessenger;
    use crate::testkit::store::MemoryStore;

    const ADMIN: RecipientId = RecipientId::new(1);
    const USER: RecipientId = RecipientId::new(7);

    fn control() -> (Control, Arc<MonitorState>) {
        let state = Arc::new(MonitorState::new(ADMIN, Arc::new(MemoryStore::new())));
        let control = Control::new(
            state.clone(),
            Arc::new(ScriptedFetcher::new()),
            Arc::new(RecordingMessenger::new()),
            Duration::from_secs(5),
        );
        (control, state)
    }

    fn subscribe(addr: &Address) -> Command {
        Command::Subscribe {
            address: addr.to_string(),
            name: None,
        }
    }

    #[test]
    fn myid_and_help() {
        let (control, _) = control();

        let effects = control.apply(USER, Command::MyId).unwrap();
        assert_eq!(effects.replies, vec![(USER, "🆔 Your chat ID is: 7".to_string())]);

        let effects = control.apply(USER, Command::Help).unwrap();
        assert_eq!(effects.replies[0].1, command_help());
    }

    #[test]
    fn unauthorized_subscribe_is_rejected_before_validation() {
        let (control, state) = control();

        let err = control
            .apply(
                USER,
                Command::Subscribe {
                    address: "garbage".into(),
                    name: None,
                },
            )
            .unwrap_err();

        assert_eq!(err, ControlError::NotAuthorized(USER));
        assert_eq!(state.subscription_count(), 0);
    }

    #[test]
    fn invalid_address_is_rejected() {
        let (control, state) = control();

        let err = control
            .apply(
                ADMIN,
                Command::Subscribe {
                    address: "0x123".into(),
                    name: None,
                },
            )
            .unwrap_err();

        assert_eq!(err, ControlError::InvalidAddress("0x123".into()));
        assert_eq!(state.subscription_count(), 0);
    }

    #[test]
    fn subscribe_uses_default_name_and_requests_initial_status() {
        let (control, state) = control();

        let effects = control.apply(ADMIN, subscribe(&address(1))).unwrap();

        let subscription = effects.initial_status.unwrap();
        assert_eq!(subscription.name, "Unnamed account");
        assert_eq!(
            effects.replies[0].1,
            format!("✅ Subscribed to {} (Unnamed account)", address(1).short())
        );
        assert_eq!(state.subscriptions_for(ADMIN), vec![subscription]);
    }

    #[test]
    fn duplicate_subscribe_replies_already_subscribed() {
        let (control, _) = control();
        control.apply(ADMIN, subscribe(&address(1))).unwrap();

        let effects = control.apply(ADMIN, subscribe(&address(1))).unwrap();

        assert!(effects.initial_status.is_none());
        assert!(effects.replies[0].1.contains("already subscribed"));
    }

    #[test]
    fn unsubscribe_unknown_replies_not_subscribed() {
        let (control, _) = control();

        let effects = control
            .apply(
                USER,
                Command::Unsubscribe {
                    address: address(1).to_string(),
                },
            )
            .unwrap();

        assert!(effects.replies[0].1.contains("not subscribed"));
    }

    #[test]
    fn list_shows_short_addresses() {
        let (control, _) = control();
        control
            .apply(
                ADMIN,
                Command::Subscribe {
                    address: address(1).to_string(),
                    name: Some("Whale".into()),
                },
            )
            .unwrap();

        let effects = control.apply(ADMIN, Command::List).unwrap();
        let text = &effects.replies[0].1;

        assert!(text.contains(&format!("1. {} - Whale", address(1).short())));
        assert!(!text.contains(address(1).as_str()));
    }

    #[test]
    fn empty_list() {
        let (control, _) = control();
        let effects = control.apply(USER, Command::List).unwrap();
        assert_eq!(effects.replies[0].1, "You have no subscriptions.");
    }

    #[test]
    fn admin_commands_require_super_admin() {
        let (control, state) = control();

        let err = control
            .apply(USER, Command::Authorize { target: Some("8".into()) })
            .unwrap_err();

        assert_eq!(err, ControlError::AdminOnly);
        assert!(!state.is_authorized(RecipientId::new(8)));
    }

    #[test]
    fn admin_check_precedes_missing_target() {
        let (control, _) = control();

        let err = control
            .apply(USER, Command::Deauthorize { target: None })
            .unwrap_err();
        assert_eq!(err, ControlError::AdminOnly);

        let err = control
            .apply(ADMIN, Command::Authorize { target: None })
            .unwrap_err();
        assert_eq!(err, ControlError::MissingArgument("/authorize <chat_id>"));
        assert_eq!(err.to_string(), "usage: /authorize <chat_id>");
    }

    #[test]
    fn authorize_notifies_target_and_admin() {
        let (control, state) = control();

        let effects = control
            .apply(ADMIN, Command::Authorize { target: Some("7".into()) })
            .unwrap();

        assert!(state.is_authorized(USER));
        let recipients: Vec<_> = effects.replies.iter().map(|(to, _)| *to).collect();
        assert_eq!(recipients, vec![USER, ADMIN]);
    }

    #[test]
    fn authorize_rejects_non_numeric_target() {
        let (control, _) = control();

        let err = control
            .apply(ADMIN, Command::Authorize { target: Some("bob".into()) })
            .unwrap_err();

        assert_eq!(err, ControlError::InvalidRecipient("bob".into()));
    }

    #[test]
    fn admin_cannot_be_deauthorized() {
        let (control, state) = control();

        let err = control
            .apply(ADMIN, Command::Deauthorize { target: Some("1".into()) })
            .unwrap_err();

        assert_eq!(err, ControlError::CannotDeauthorizeAdmin);
        assert!(state.is_authorized(ADMIN));
    }

    #[test]
    fn deauthorize_revokes_and_notifies() {
        let (control, state) = control();
        control
            .apply(ADMIN, Command::Authorize { target: Some("7".into()) })
            .unwrap();

        let effects = control
            .apply(ADMIN, Command::Deauthorize { target: Some("7".into()) })
            .unwrap();

        assert!(!state.is_authorized(USER));
        assert_eq!(effects.replies.len(), 2);

        let effects = control
            .apply(ADMIN, Command::Deauthorize { target: Some("7".into()) })
            .unwrap();
        assert_eq!(effects.replies, vec![(ADMIN, "ℹ️ Chat 7 is not authorized.".to_string())]);
    }
}

//! Recording [`Messenger`] for tests.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::RecipientId;
use crate::error::{Error, Result};
use crate::port::outbound::notifier::Messenger;

/// Thread-safe message collector for delivery assertions in tests.
///
/// Messages to recipients marked with [`fail_for`](Self::fail_for) are
/// rejected and not recorded.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(RecipientId, String)>>,
    failing: Mutex<HashSet<RecipientId>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every message to `recipient`.
    pub fn fail_for(&self, recipient: RecipientId) {
        self.failing.lock().insert(recipient);
    }

    /// Everything delivered so far, in order.
    pub fn sent(&self) -> Vec<(RecipientId, String)> {
        self.sent.lock().clone()
    }

    /// Messages delivered to one recipient, in order.
    pub fn sent_to(&self, recipient: RecipientId) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(to, _)| *to == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, recipient: RecipientId, text: &str) -> Result<()> {
        if self.failing.lock().contains(&recipient) {
            return Err(Error::Transport(format!("chat {recipient} unreachable")));
        }
        self.sent.lock().push((recipient, text.to_string()));
        Ok(())
    }
}

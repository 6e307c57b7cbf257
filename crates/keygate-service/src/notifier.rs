//! Tracing-backed notifier
//!
//! Delivery channels (mail, messengers) are collaborators outside this
//! service; the default wiring simply logs each notification. In
//! development that log line is also how the operator reads two-factor
//! codes.

use async_trait::async_trait;
use keygate_core::{NotificationEvent, Notifier, UserId};

/// `Notifier` implementation that writes every message to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: UserId, message: &str, event: NotificationEvent) {
        tracing::info!(
            user_id = %user_id,
            event = %event,
            message,
            "user notification"
        );
    }
}

//! Transient status notifications.
//!
//! A notification stays visible for [`NOTIFICATION_TTL`] and then clears
//! itself. Showing a new one replaces the current message and restarts the
//! timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Kind of notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// The report was saved.
    Success,
    /// The submission failed.
    Error,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message text.
    pub message: String,
    /// Kind of message.
    pub kind: NotificationKind,
}

impl Notification {
    /// A success message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }

    /// An error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    current: Option<Notification>,
}

/// Holds at most one notification and clears it after a timeout.
///
/// Must be used inside a tokio runtime.
#[derive(Debug)]
pub struct Notifier {
    slot: Arc<RwLock<Slot>>,
    timer: Option<JoinHandle<()>>,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl Notifier {
    /// Create a notifier with a custom timeout.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot::default())),
            timer: None,
            ttl,
        }
    }

    /// Show `notification`, replacing any current one and restarting the timer.
    pub async fn show(&mut self, notification: Notification) {
        self.cancel_timer();

        let generation = {
            let mut slot = self.slot.write().await;
            slot.generation = slot.generation.wrapping_add(1);
            slot.current = Some(notification);
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        let ttl = self.ttl;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut slot = slot.write().await;
            // A newer notification owns the slot now.
            if slot.generation == generation {
                slot.current = None;
            }
        }));
    }

    /// Clear the current notification immediately.
    pub async fn dismiss(&mut self) {
        self.cancel_timer();
        let mut slot = self.slot.write().await;
        slot.generation = slot.generation.wrapping_add(1);
        slot.current = None;
    }

    /// The notification currently visible, if any.
    pub async fn current(&self) -> Option<Notification> {
        self.slot.read().await.current.clone()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

//! User Notifications
//!
//! Fire-and-forget, display-ready messages emitted by engine commands
//! ("Purchase successful! Database updated."). Delivery failures never fail
//! the command that raised them.

use std::sync::Arc;

use tracing::info;

/// Notification sink.
///
/// Implementations must not block and must not return errors; a dropped
/// notification is acceptable, a failed command is not.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Shared handle to the notifier
pub type SharedNotifier = Arc<dyn Notifier>;

/// Default sink that writes notifications to the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(notification = %message);
    }
}

/// Sink that collects messages for assertions in tests
#[derive(Debug, Default)]
pub struct BufferNotifier {
    messages: parking_lot::Mutex<Vec<String>>,
}

impl BufferNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages delivered so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Remove and return all delivered messages.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl Notifier for BufferNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

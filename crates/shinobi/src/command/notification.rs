use serde::Serialize;

use super::Operation;

/// Reported after a boolean-result operation completes.
///
/// Serializes as `{"flag": "toggle-stealth", "value": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub flag: Operation,
    pub value: bool,
}

/// Receiver for notifications (the shell's renderer, or a Vec in tests)
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

//! Notifications printed to the terminal.

use std::cell::RefCell;

use listview_model::{Notification, NotificationKind, Notifier};

/// Prints each notification to stderr and remembers it, so the command can
/// decide its exit status afterwards.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    seen: RefCell<Vec<Notification>>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.borrow().clone()
    }

    pub fn has_errors(&self) -> bool {
        self.seen
            .borrow()
            .iter()
            .any(|notification| notification.kind == NotificationKind::Error)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let prefix = match notification.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
            NotificationKind::Info => "note",
        };
        eprintln!("{prefix}: {}", notification.text);
        self.seen.borrow_mut().push(notification);
    }
}

//! Notification surface for user-facing outcome messages.
//!
//! Notifications are fire-and-forget: the caller never waits for or depends
//! on their delivery.
use std::{cell::RefCell, rc::Rc};

use console::style;
use log::{error, info, warn};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Receives success, warning and error messages from the session
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn notify(&self, level: NoticeLevel, message: &str) {
        (**self).notify(level, message);
    }
}

/// Prints styled notifications on stderr
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => {
                info!("{}", message);
                eprintln!("{} {}", style("✔").green().bold(), message);
            }
            NoticeLevel::Warning => {
                warn!("{}", message);
                eprintln!("{} {}", style("!").yellow().bold(), style(message).yellow());
            }
            NoticeLevel::Error => {
                error!("{}", message);
                eprintln!("{} {}", style("✘").red().bold(), style(message).red());
            }
        }
    }
}

/// Keeps every notification in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: RefCell<Vec<(NoticeLevel, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.borrow().clone()
    }

    /// The most recent notification, if any
    pub fn last(&self) -> Option<(NoticeLevel, String)> {
        self.notices.borrow().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.borrow_mut().push((level, message.to_string()));
    }
}

//! Bounded event log shown on the logs page.
//!
//! The notifier appends, request handlers take snapshots. Both sides hold
//! the lock only while the deque is mutated or copied.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

use super::severity::{Severity, SeverityClassMap};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Payload of a notifier message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    Message(String),
    /// Multi-line detail (e.g. a status dump) belonging to the previous message.
    Attachment(String),
}

/// A message emitted by the notifier.
#[derive(Debug, Clone)]
pub struct Notification {
    pub time: DateTime<Local>,
    pub severity: Severity,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn message<S: Into<String>>(severity: Severity, text: S) -> Self {
        Self {
            time: Local::now(),
            severity,
            kind: NotificationKind::Message(text.into()),
        }
    }

    pub fn attachment<S: Into<String>>(severity: Severity, text: S) -> Self {
        Self {
            time: Local::now(),
            severity,
            kind: NotificationKind::Attachment(text.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub time: String,
    pub severity: String,
    pub class: String,
    pub text: String,
    pub attachment: String,
}

/// FIFO ring of log entries with attachment coalescing.
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    classes: SeverityClassMap,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl EventLog {
    pub fn new(capacity: usize, classes: SeverityClassMap) -> Self {
        Self {
            capacity,
            classes,
            // +1: an append briefly exceeds capacity before eviction
            entries: Mutex::new(VecDeque::with_capacity(capacity.saturating_add(1))),
        }
    }

    /// Record a notification.
    ///
    /// An attachment is merged into the newest entry if that entry has no
    /// attachment yet; otherwise it becomes an entry of its own.
    pub fn append(&self, notification: Notification) {
        let Notification {
            time,
            severity,
            kind,
        } = notification;
        let class = self.classes.classify(severity).to_string();
        let new_entry = |text: String, attachment: String| LogEntry {
            time: time.format(TIME_FORMAT).to_string(),
            severity: severity.to_string(),
            class: class.clone(),
            text,
            attachment,
        };

        let mut entries = self.entries.lock();
        match kind {
            NotificationKind::Message(text) => entries.push_back(new_entry(text, String::new())),
            NotificationKind::Attachment(attachment) => match entries.back_mut() {
                Some(last) if last.attachment.is_empty() => last.attachment = attachment,
                _ => entries.push_back(new_entry(String::new(), attachment)),
            },
        }
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

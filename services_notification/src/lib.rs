//! # Notification + Status Service
//!
//! Provides structured "toast" notifications and status-bar items for the
//! overlay: diagnostics surfaced by reads and rejected writes, and the
//! redirect indicator labels.
//!
//! ## Philosophy
//!
//! - **Structured, not stdout**: Notifications are typed events, not print statements
//! - **Deterministic**: All notifications are timestamped with logical time
//! - **Testable**: Notification history and labels can be inspected
//! - **Self-reverting labels**: Transient status labels expire on logical time,
//!   not on a background thread
//!
//! ## Example
//!
//! ```
//! use services_notification::{Notification, NotificationService, StatusItem};
//!
//! let mut service = NotificationService::new();
//! service.register_item(StatusItem::new("redirect.manual", "overlay edit"));
//!
//! service.notify(Notification::info("overlay ready", 0));
//! service.show_transient("redirect.manual", "already redirected", 2000);
//! assert_eq!(service.label("redirect.manual"), Some("already redirected"));
//!
//! service.advance_time(2000);
//! assert_eq!(service.label("redirect.manual"), Some("overlay edit"));
//! ```

use overlay_types::{aggregate_diagnostics, Diagnostic};
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Maximum number of notifications to keep in history
const MAX_NOTIFICATION_HISTORY: usize = 100;

/// Unique identifier for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new notification ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notif:{}", self.0)
    }
}

/// Notification severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// Informational message
    Info,
    /// Warning message
    Warning,
    /// Error message
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "INFO"),
            NotificationLevel::Warning => write!(f, "WARNING"),
            NotificationLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A toast notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier
    pub id: NotificationId,
    /// Notification level
    pub level: NotificationLevel,
    /// Message text
    pub message: String,
    /// Optional source component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Logical time the notification was raised (milliseconds)
    pub timestamp_ms: u64,
    /// Whether the notification has been dismissed
    pub dismissed: bool,
    /// Time-to-live in milliseconds (0 means until dismissed)
    pub ttl_ms: u64,
}

impl Notification {
    /// Creates a new notification
    pub fn new(level: NotificationLevel, message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            id: NotificationId::new(),
            level,
            message: message.into(),
            source: None,
            timestamp_ms,
            dismissed: false,
            ttl_ms: 0,
        }
    }

    /// Creates an info notification
    pub fn info(message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(NotificationLevel::Info, message, timestamp_ms).with_ttl(5_000)
    }

    /// Creates a warning notification
    pub fn warning(message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(NotificationLevel::Warning, message, timestamp_ms).with_ttl(7_000)
    }

    /// Creates an error notification
    ///
    /// Errors stay up until dismissed.
    pub fn error(message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(NotificationLevel::Error, message, timestamp_ms)
    }

    /// Sets the source component
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the time-to-live
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// Checks if this notification has expired at `now_ms`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        if self.ttl_ms == 0 {
            return false;
        }
        now_ms >= self.timestamp_ms.saturating_add(self.ttl_ms)
    }

    /// Dismisses the notification
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }
}

/// A status-bar item with a default label and an optional transient one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusItem {
    /// Item identifier
    pub id: String,
    /// Label shown when no transient label is up
    pub default_label: String,
    /// Transient label and the logical time it reverts at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient: Option<(String, u64)>,
}

impl StatusItem {
    /// Creates a status item showing `default_label`
    pub fn new(id: impl Into<String>, default_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_label: default_label.into(),
            transient: None,
        }
    }

    /// Returns the label currently shown
    pub fn label(&self) -> &str {
        match &self.transient {
            Some((label, _)) => label,
            None => &self.default_label,
        }
    }
}

/// Notification service
pub struct NotificationService {
    /// All notifications (including dismissed ones)
    notifications: VecDeque<Notification>,
    /// Status-bar items in registration order
    items: Vec<StatusItem>,
    /// Current logical time (milliseconds)
    current_time_ms: u64,
}

impl NotificationService {
    /// Creates a new notification service
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
            items: Vec::new(),
            current_time_ms: 0,
        }
    }

    /// Advances the logical time
    pub fn advance_time(&mut self, delta_ms: u64) {
        self.set_time(self.current_time_ms.saturating_add(delta_ms));
    }

    /// Sets the logical time, expiring toasts and transient labels
    ///
    /// Time never moves backwards; an earlier value is ignored.
    pub fn set_time(&mut self, now_ms: u64) {
        self.current_time_ms = self.current_time_ms.max(now_ms);
        self.expire();
    }

    /// Returns the current logical time
    pub fn current_time(&self) -> u64 {
        self.current_time_ms
    }

    /// Sends a notification
    pub fn notify(&mut self, notification: Notification) {
        tracing::debug!(
            target: "overlay::notify",
            level = %notification.level,
            message = %notification.message,
            "notification"
        );
        self.notifications.push_back(notification);

        while self.notifications.len() > MAX_NOTIFICATION_HISTORY {
            self.notifications.pop_front();
        }
    }

    /// Raises one error notification listing every diagnostic
    ///
    /// Does nothing for an empty list.
    pub fn notify_diagnostics(&mut self, source: &str, diagnostics: &[Diagnostic]) {
        if diagnostics.is_empty() {
            return;
        }
        let message = aggregate_diagnostics(diagnostics);
        self.notify(Notification::error(message, self.current_time_ms).with_source(source));
    }

    /// Registers a status item, replacing any item with the same id
    pub fn register_item(&mut self, item: StatusItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Sets an item's default label and drops any transient label
    ///
    /// Returns false if the item is not registered.
    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.default_label = label.into();
                item.transient = None;
                true
            }
            None => false,
        }
    }

    /// Shows `label` on an item until `duration_ms` of logical time passes
    ///
    /// Returns false if the item is not registered.
    pub fn show_transient(&mut self, id: &str, label: impl Into<String>, duration_ms: u64) -> bool {
        let until = self.current_time_ms.saturating_add(duration_ms);
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.transient = Some((label.into(), until));
                true
            }
            None => false,
        }
    }

    /// Returns the label an item currently shows
    pub fn label(&self, id: &str) -> Option<&str> {
        self.items.iter().find(|i| i.id == id).map(StatusItem::label)
    }

    /// Returns every status item
    pub fn items(&self) -> &[StatusItem] {
        &self.items
    }

    /// Returns active (non-dismissed, non-expired) notifications
    pub fn get_active_toasts(&self) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| !n.dismissed && !n.is_expired(self.current_time_ms))
            .collect()
    }

    /// Returns recent notifications, most recent first
    pub fn get_recent_notifications(&self, limit: usize) -> Vec<&Notification> {
        self.notifications.iter().rev().take(limit).collect()
    }

    /// Returns notifications filtered by level
    pub fn get_notifications_by_level(&self, level: NotificationLevel) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.level == level)
            .collect()
    }

    /// Dismisses a notification by ID
    pub fn dismiss_notification(&mut self, id: NotificationId) -> bool {
        if let Some(notification) = self.notifications.iter_mut().find(|n| n.id == id) {
            notification.dismiss();
            true
        } else {
            false
        }
    }

    /// Dismisses all notifications
    pub fn dismiss_all(&mut self) {
        for notification in &mut self.notifications {
            notification.dismiss();
        }
    }

    /// Returns the total number of notifications in history
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    fn expire(&mut self) {
        let now = self.current_time_ms;
        self.notifications.retain(|n| !n.is_expired(now));
        for item in &mut self.items {
            if item.transient.as_ref().is_some_and(|(_, until)| now >= *until) {
                tracing::debug!(target: "overlay::notify", item = %item.id, "transient label reverted");
                item.transient = None;
            }
        }
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to one notification service
///
/// The overlay provider, the redirect service and the host all report into
/// the same service; cloning the handle shares it.
#[derive(Clone, Default)]
pub struct NotificationHandle(Rc<RefCell<NotificationService>>);

impl NotificationHandle {
    /// Creates a handle to a fresh service
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends a notification
    pub fn notify(&self, notification: Notification) {
        self.0.borrow_mut().notify(notification);
    }

    /// Sends an info notification stamped with the current logical time
    pub fn info(&self, message: impl Into<String>) {
        let mut service = self.0.borrow_mut();
        let now = service.current_time();
        service.notify(Notification::info(message, now));
    }

    /// Raises one aggregated error notification for `diagnostics`
    pub fn notify_diagnostics(&self, source: &str, diagnostics: &[Diagnostic]) {
        self.0.borrow_mut().notify_diagnostics(source, diagnostics);
    }

    /// Registers a status item
    pub fn register_item(&self, item: StatusItem) {
        self.0.borrow_mut().register_item(item);
    }

    /// Sets an item's default label
    pub fn set_label(&self, id: &str, label: impl Into<String>) -> bool {
        self.0.borrow_mut().set_label(id, label)
    }

    /// Shows a transient label
    pub fn show_transient(&self, id: &str, label: impl Into<String>, duration_ms: u64) -> bool {
        self.0.borrow_mut().show_transient(id, label, duration_ms)
    }

    /// Returns the label an item currently shows
    pub fn label(&self, id: &str) -> Option<String> {
        self.0.borrow().label(id).map(str::to_string)
    }

    /// Moves logical time forward to `now_ms`
    pub fn set_time(&self, now_ms: u64) {
        self.0.borrow_mut().set_time(now_ms);
    }

    /// Borrows the service for inspection
    pub fn service(&self) -> Ref<'_, NotificationService> {
        self.0.borrow()
    }
}

//! Manual redirect
//!
//! The `redirectActive` command: redirect the active document on request.

use crate::host::EditorHost;
use crate::monitor::{redirect, resolve, RedirectOutcome, SkipReason};
use crate::service::RedirectError;
use overlay_types::TRANSIENT_LABEL_MS;
use services_notification::{NotificationHandle, StatusItem};

/// Status item for the manual command
pub const MANUAL_ITEM: &str = "redirect.manual";

/// Default label of the manual command item
pub const MANUAL_LABEL: &str = "overlay edit";

/// Transient label shown when the active document is already an overlay view
pub const ALREADY_REDIRECTED_LABEL: &str = "already redirected";

/// Manual redirect command
pub struct ManualRedirect {
    notifications: NotificationHandle,
}

impl ManualRedirect {
    /// Creates the command and shows its default label
    pub fn new(notifications: NotificationHandle) -> Self {
        notifications.register_item(StatusItem::new(MANUAL_ITEM, MANUAL_LABEL));
        Self { notifications }
    }

    /// Redirects the active document
    ///
    /// Unlike the monitor, any extension is accepted. An overlay document
    /// shows the "already redirected" label for a while instead.
    pub fn run(&self, host: &mut dyn EditorHost) -> Result<RedirectOutcome, RedirectError> {
        let Some(uri) = host.active_document() else {
            tracing::debug!(target: "overlay::redirect", "manual redirect: no active document");
            return Ok(RedirectOutcome::Skipped(SkipReason::NoActiveDocument));
        };

        if uri.is_overlay() {
            self.notifications
                .show_transient(MANUAL_ITEM, ALREADY_REDIRECTED_LABEL, TRANSIENT_LABEL_MS);
            return Ok(RedirectOutcome::Skipped(SkipReason::AlreadyOverlay));
        }
        if !uri.is_file() {
            tracing::debug!(target: "overlay::redirect", uri = %uri, "manual redirect: not a file");
            return Ok(RedirectOutcome::Skipped(SkipReason::NotFileScheme));
        }

        match resolve(&uri) {
            Ok(identity) => redirect(host, uri, identity),
            Err(reason) => {
                tracing::debug!(target: "overlay::redirect", uri = %uri, ?reason, "manual redirect skipped");
                Ok(RedirectOutcome::Skipped(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeHost;
    use overlay_types::DocumentUri;

    #[test]
    fn test_default_label() {
        let notifications = NotificationHandle::new();
        ManualRedirect::new(notifications.clone());
        assert_eq!(notifications.label(MANUAL_ITEM).as_deref(), Some(MANUAL_LABEL));
    }

    #[test]
    fn test_redirects_untracked_extension() {
        let manual = ManualRedirect::new(NotificationHandle::new());
        let mut host = FakeHost::with_active(DocumentUri::file("/notes/todo.md"));

        let outcome = manual.run(&mut host).unwrap();
        assert!(outcome.is_redirected());
        assert_eq!(
            host.active_document().unwrap().to_string(),
            "overlay://overlay//notes/todo.md"
        );
    }

    #[test]
    fn test_already_redirected_label_reverts() {
        let notifications = NotificationHandle::new();
        let manual = ManualRedirect::new(notifications.clone());
        let overlay = DocumentUri::parse("overlay://overlay//tmp/a.js").unwrap();
        let mut host = FakeHost::with_active(overlay);

        let outcome = manual.run(&mut host).unwrap();
        assert_eq!(outcome, RedirectOutcome::Skipped(SkipReason::AlreadyOverlay));
        assert!(host.calls.is_empty());
        assert_eq!(
            notifications.label(MANUAL_ITEM).as_deref(),
            Some(ALREADY_REDIRECTED_LABEL)
        );

        notifications.set_time(TRANSIENT_LABEL_MS - 1);
        assert_eq!(
            notifications.label(MANUAL_ITEM).as_deref(),
            Some(ALREADY_REDIRECTED_LABEL)
        );
        notifications.set_time(TRANSIENT_LABEL_MS);
        assert_eq!(notifications.label(MANUAL_ITEM).as_deref(), Some(MANUAL_LABEL));
    }

    #[test]
    fn test_non_file_document_is_left_alone() {
        let notifications = NotificationHandle::new();
        let manual = ManualRedirect::new(notifications.clone());
        let mut host = FakeHost::with_active(DocumentUri::parse("untitled:Untitled-1").unwrap());

        let outcome = manual.run(&mut host).unwrap();
        assert_eq!(outcome, RedirectOutcome::Skipped(SkipReason::NotFileScheme));
        assert!(host.calls.is_empty());
        assert_eq!(notifications.service().notification_count(), 0);
    }

    #[test]
    fn test_no_active_document() {
        let manual = ManualRedirect::new(NotificationHandle::new());
        let mut host = FakeHost::default();
        assert_eq!(
            manual.run(&mut host).unwrap(),
            RedirectOutcome::Skipped(SkipReason::NoActiveDocument)
        );
    }
}

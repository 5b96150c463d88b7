//! Redirect automation driven through the composed service
//!
//! A small tab-list host records what the service asks of it.

use overlay_types::{DocumentUri, POLL_INTERVAL_MS, TRANSIENT_LABEL_MS};
use services_notification::NotificationHandle;
use services_redirect::{
    CommandId, DocumentId, EditorHost, HostError, RedirectOutcome, RedirectService, ShowOptions,
    SkipReason, ToggleState, ALREADY_REDIRECTED_LABEL, MANUAL_ITEM, MANUAL_LABEL, TOGGLE_ITEM,
    TOGGLE_LABEL_OFF, TOGGLE_LABEL_ON,
};

#[derive(Default)]
struct TabHost {
    tabs: Vec<(DocumentId, DocumentUri, bool)>,
    active: Option<DocumentId>,
    closes: usize,
}

impl TabHost {
    fn open_real(&mut self, path: &str) {
        let id = DocumentId::new();
        self.tabs.push((id, DocumentUri::file(path), true));
        self.active = Some(id);
    }

    fn active_preview(&self) -> Option<bool> {
        let active = self.active?;
        self.tabs
            .iter()
            .find(|(id, _, _)| *id == active)
            .map(|(_, _, preview)| *preview)
    }
}

impl EditorHost for TabHost {
    fn active_document(&self) -> Option<DocumentUri> {
        let active = self.active?;
        self.tabs
            .iter()
            .find(|(id, _, _)| *id == active)
            .map(|(_, uri, _)| uri.clone())
    }

    fn close_active(&mut self) -> Result<(), HostError> {
        let active = self.active.take().ok_or(HostError::NoActiveDocument)?;
        self.tabs.retain(|(id, _, _)| *id != active);
        self.active = self.tabs.last().map(|(id, _, _)| *id);
        self.closes += 1;
        Ok(())
    }

    fn open_document(&mut self, uri: &DocumentUri) -> Result<DocumentId, HostError> {
        if let Some((id, _, _)) = self.tabs.iter().find(|(_, open, _)| open == uri) {
            return Ok(*id);
        }
        let id = DocumentId::new();
        self.tabs.push((id, uri.clone(), true));
        Ok(id)
    }

    fn show_document(&mut self, id: DocumentId, options: ShowOptions) -> Result<(), HostError> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|(tab, _, _)| *tab == id)
            .ok_or(HostError::UnknownDocument(id))?;
        tab.2 = options.preview;
        self.active = Some(id);
        Ok(())
    }
}

#[test]
fn test_toggle_twice_returns_to_off_with_no_pollers() {
    let notifications = NotificationHandle::new();
    let mut service = RedirectService::new(notifications.clone());
    let mut host = TabHost::default();

    service
        .execute_command(CommandId::ToggleRedirect, &mut host)
        .unwrap();
    assert_eq!(service.live_pollers(), 1);
    service
        .execute_command(CommandId::ToggleRedirect, &mut host)
        .unwrap();

    assert_eq!(service.state(), ToggleState::Off);
    assert_eq!(service.live_pollers(), 0);
    assert_eq!(notifications.label(TOGGLE_ITEM).as_deref(), Some(TOGGLE_LABEL_OFF));
}

#[test]
fn test_no_tick_after_disable() {
    let mut service = RedirectService::new(NotificationHandle::new());
    let mut host = TabHost::default();
    host.open_real("/work/a.ts");

    service.execute("toggleRedirect", &mut host).unwrap();
    service.advance(POLL_INTERVAL_MS - 10, &mut host);
    service.execute("toggleRedirect", &mut host).unwrap();

    assert!(service.advance(5 * POLL_INTERVAL_MS, &mut host).is_empty());
    assert_eq!(host.closes, 0);
    assert!(host.active_document().unwrap().is_file());
}

#[test]
fn test_redirected_view_is_not_a_preview() {
    let mut service = RedirectService::new(NotificationHandle::new());
    let mut host = TabHost::default();
    host.open_real("/work/a.ts");
    assert_eq!(host.active_preview(), Some(true));

    service.execute("toggleRedirect", &mut host).unwrap();
    let outcomes = service.advance(POLL_INTERVAL_MS, &mut host);

    assert_eq!(outcomes.len(), 1);
    let active = host.active_document().unwrap();
    assert_eq!(active.to_string(), "overlay://overlay//work/a.ts");
    assert_eq!(host.active_preview(), Some(false));
    assert_eq!(host.tabs.len(), 1);
}

#[test]
fn test_missed_periods_produce_one_redirect_attempt() {
    let mut service = RedirectService::new(NotificationHandle::new());
    let mut host = TabHost::default();
    host.open_real("/work/b.js");
    service.execute("toggleRedirect", &mut host).unwrap();

    let outcomes = service.advance(4 * POLL_INTERVAL_MS + 1, &mut host);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(host.closes, 1);
}

#[test]
fn test_untracked_and_overlay_documents_are_never_redirected() {
    let notifications = NotificationHandle::new();
    let mut service = RedirectService::new(notifications.clone());
    let mut host = TabHost::default();
    host.open_real("/work/readme.md");
    service.execute("toggleRedirect", &mut host).unwrap();

    let outcomes = service.advance(POLL_INTERVAL_MS, &mut host);
    assert_eq!(
        outcomes,
        vec![RedirectOutcome::Skipped(SkipReason::UntrackedExtension)]
    );

    host.open_real("/work/c.mts");
    service.advance(2 * POLL_INTERVAL_MS, &mut host);
    let outcomes = service.advance(3 * POLL_INTERVAL_MS, &mut host);
    assert_eq!(
        outcomes,
        vec![RedirectOutcome::Skipped(SkipReason::AlreadyOverlay)]
    );
    assert_eq!(host.closes, 1);

    // Only the ready notice; skips are silent
    assert_eq!(notifications.service().notification_count(), 1);
}

#[test]
fn test_manual_redirect_then_already_redirected() {
    let notifications = NotificationHandle::new();
    let mut service = RedirectService::new(notifications.clone());
    let mut host = TabHost::default();
    host.open_real("/work/d.cjs");

    let first = service.execute("redirectActive", &mut host).unwrap();
    assert!(first.unwrap().is_redirected());
    assert_eq!(notifications.label(MANUAL_ITEM).as_deref(), Some(MANUAL_LABEL));

    service.advance(1_000, &mut host);
    let second = service.execute("redirectActive", &mut host).unwrap();
    assert_eq!(
        second,
        Some(RedirectOutcome::Skipped(SkipReason::AlreadyOverlay))
    );
    assert_eq!(
        notifications.label(MANUAL_ITEM).as_deref(),
        Some(ALREADY_REDIRECTED_LABEL)
    );

    service.advance(1_000 + TRANSIENT_LABEL_MS, &mut host);
    assert_eq!(notifications.label(MANUAL_ITEM).as_deref(), Some(MANUAL_LABEL));
}

#[test]
fn test_manual_redirect_works_while_toggle_off() {
    let notifications = NotificationHandle::new();
    let mut service = RedirectService::new(notifications.clone());
    let mut host = TabHost::default();
    host.open_real("/work/e.ts");

    service.execute("redirectActive", &mut host).unwrap();
    assert!(host.active_document().unwrap().is_overlay());
    assert_eq!(service.state(), ToggleState::Off);
    assert_eq!(notifications.label(TOGGLE_ITEM).as_deref(), Some(TOGGLE_LABEL_OFF));
    assert_ne!(notifications.label(TOGGLE_ITEM).as_deref(), Some(TOGGLE_LABEL_ON));
}

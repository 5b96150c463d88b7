//! End-to-end editor sessions
//!
//! Real files in a temporary directory, the built-in style engine, the
//! overlay provider, and the redirect service, all driven through the
//! simulated editor.

use lint_engine::StyleEngine;
use overlay_types::{POLL_INTERVAL_MS, TRANSIENT_LABEL_MS};
use services_notification::{NotificationHandle, NotificationLevel};
use services_overlay_fs::{OverlayFileSystem, ProviderError};
use services_redirect::{
    EditorHost, HostError, RedirectService, ALREADY_REDIRECTED_LABEL, MANUAL_ITEM, MANUAL_LABEL,
};
use sim_editor::SimEditor;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

struct Session {
    dir: TempDir,
    editor: SimEditor,
    redirect: RedirectService,
    notifications: NotificationHandle,
}

impl Session {
    fn new() -> Self {
        let notifications = NotificationHandle::new();
        let provider = OverlayFileSystem::new(StyleEngine::new(), notifications.clone());
        Self {
            dir: TempDir::new().unwrap(),
            editor: SimEditor::new(Rc::new(provider)),
            redirect: RedirectService::new(notifications.clone()),
            notifications,
        }
    }

    fn file(&self, name: &str, content: &str) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn command(&mut self, id: &str) {
        self.redirect.execute(id, &mut self.editor).unwrap();
    }

    fn advance(&mut self, now_ms: u64) {
        self.redirect.advance(now_ms, &mut self.editor);
    }

    fn error_count(&self) -> usize {
        self.notifications
            .service()
            .get_notifications_by_level(NotificationLevel::Error)
            .len()
    }
}

#[test]
fn test_auto_redirect_shows_fixed_text_and_saves_it() {
    let mut session = Session::new();
    let path = session.file("a.js", "let x=1");

    session.editor.open_file(&path).unwrap();
    session.command("toggleRedirect");
    session.advance(POLL_INTERVAL_MS);

    let tab = session.editor.active_tab().unwrap();
    assert!(tab.uri.is_overlay());
    assert!(!tab.preview);
    assert_eq!(tab.text, "let x = 1;\n");
    assert_eq!(session.editor.tabs().len(), 1);
    assert_eq!(session.error_count(), 0);

    session.editor.save_active().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "let x = 1;\n");
}

#[test]
fn test_rejected_save_keeps_file_and_edits() {
    let mut session = Session::new();
    let path = session.file("b.js", "let y = 1;\n");

    session.editor.open_file(&path).unwrap();
    session.command("redirectActive");
    session.editor.edit_active("let y=2").unwrap();

    let err = session.editor.save_active().unwrap_err();
    assert!(matches!(
        err,
        HostError::Provider(ProviderError::UnresolvedViolations { .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "let y = 1;\n");

    let tab = session.editor.active_tab().unwrap();
    assert!(tab.dirty);
    assert_eq!(tab.text, "let y=2");
    assert_eq!(session.error_count(), 1);
}

#[test]
fn test_untracked_file_stays_real_under_poller() {
    let mut session = Session::new();
    let path = session.file("notes.md", "# notes\n");

    session.editor.open_file(&path).unwrap();
    session.command("toggleRedirect");
    session.advance(3 * POLL_INTERVAL_MS);

    let active = session.editor.active_document().unwrap();
    assert!(active.is_file());
    assert_eq!(session.editor.active_tab().unwrap().text, "# notes\n");
}

#[test]
fn test_redirect_survives_missing_file() {
    let mut session = Session::new();
    let path = session.file("gone.ts", "const a = 1;\n");
    session.editor.open_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    session.command("toggleRedirect");
    session.advance(POLL_INTERVAL_MS);

    // The real tab was closed and the overlay could not be read
    assert!(session.editor.active_tab().is_none());
    assert_eq!(session.redirect.live_pollers(), 1);

    let other = session.file("next.ts", "const b=2\n");
    session.editor.open_file(&other).unwrap();
    session.advance(2 * POLL_INTERVAL_MS);
    assert_eq!(
        session.editor.active_tab().unwrap().text,
        "const b = 2;\n"
    );
}

#[test]
fn test_manual_redirect_twice_shows_transient_label() {
    let mut session = Session::new();
    let path = session.file("c.ts", "const c = 3;\n");
    session.editor.open_file(&path).unwrap();

    session.command("redirectActive");
    session.command("redirectActive");
    assert_eq!(
        session.notifications.label(MANUAL_ITEM).as_deref(),
        Some(ALREADY_REDIRECTED_LABEL)
    );

    session.advance(TRANSIENT_LABEL_MS);
    assert_eq!(
        session.notifications.label(MANUAL_ITEM).as_deref(),
        Some(MANUAL_LABEL)
    );
}

#[test]
fn test_real_tab_save_writes_directly() {
    let mut session = Session::new();
    let path = session.file("raw.js", "let x = 1;\n");
    session.editor.open_file(&path).unwrap();

    session.editor.edit_active("let x=1").unwrap();
    session.editor.save_active().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "let x=1");
}

#[test]
fn test_single_click_replaces_previous_preview() {
    let mut session = Session::new();
    let first = session.file("one.ts", "const a = 1;\n");
    let second = session.file("two.ts", "const b = 2;\n");

    session.editor.open_file(&first).unwrap();
    session.editor.open_file(&second).unwrap();
    assert_eq!(session.editor.tabs().len(), 1);

    session.editor.edit_active("const b = 3;\n").unwrap();
    session.editor.open_file(&first).unwrap();
    assert_eq!(session.editor.tabs().len(), 2);
}

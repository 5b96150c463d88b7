//! Host runtime against real files

use overlayd::{OverlayRuntime, RuntimeError, SessionRunner, SessionScript};
use services_overlay_fs::{ProviderError, ProviderErrorKind};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_read_returns_fixed_text_without_touching_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.js");
    fs::write(&path, "let x=1").unwrap();

    let runtime = OverlayRuntime::new();
    let report = runtime.read(&path).unwrap();

    assert_eq!(report.output, "let x = 1;\n");
    assert!(report.is_clean());
    assert_eq!(fs::read_to_string(&path).unwrap(), "let x=1");
    assert!(runtime.last_error().is_none());
}

#[test]
fn test_write_rejects_and_reports_aggregate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("b.ts");
    fs::write(&path, "const a = 1;\n").unwrap();

    let runtime = OverlayRuntime::new();
    let err = runtime.write(&path, "const a = 2").unwrap_err();

    match err {
        RuntimeError::Provider(err) => assert_eq!(err.kind(), ProviderErrorKind::NoPermissions),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "const a = 1;\n");
    let message = runtime.last_error().unwrap();
    assert!(message.contains(":"));
}

#[test]
fn test_write_commits_clean_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("c.mjs");
    fs::write(&path, "let c = 0;\n").unwrap();

    let runtime = OverlayRuntime::new();
    runtime.write(&path, "let c = 1;\n").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "let c = 1;\n");
}

#[test]
fn test_check_reports_findings() {
    let dir = TempDir::new().unwrap();
    let clean = dir.path().join("clean.js");
    let dirty = dir.path().join("dirty.js");
    fs::write(&clean, "let x = 1;\n").unwrap();
    fs::write(&dirty, "let x=1").unwrap();

    let runtime = OverlayRuntime::new();
    assert!(runtime.check(&clean).unwrap().is_clean());
    assert!(!runtime.check(&dirty).unwrap().is_clean());
    assert_eq!(fs::read_to_string(&dirty).unwrap(), "let x=1");
}

#[test]
fn test_read_missing_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let runtime = OverlayRuntime::new();
    let err = runtime.read(&dir.path().join("missing.js")).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Provider(ProviderError::SourceUnavailable { .. })
    ));
}

#[test]
fn test_session_redirects_and_saves() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.js"), "let x=1").unwrap();

    let script = SessionScript::from_text(
        "open a.js\ntoggle\nwait 550\nstatus\nsave\nwait 550\n",
    )
    .unwrap();
    let report = SessionRunner::new(dir.path()).run(&script).unwrap();

    assert_eq!(report.tabs.len(), 1);
    let tab = &report.tabs[0];
    assert!(tab.uri.starts_with("overlay://overlay/"));
    assert!(tab.active);
    assert!(!tab.preview);
    assert_eq!(tab.text, "let x = 1;\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("a.js")).unwrap(),
        "let x = 1;\n"
    );
    assert_eq!(report.elapsed_ms, 1100);
    assert!(report.transcript[3].contains("redirect: on"));
    // Shut down at the end of the session
    assert!(report
        .labels
        .iter()
        .any(|(item, label)| item == "redirect.toggle" && label == "redirect: off"));
}

#[test]
fn test_session_continues_after_failed_step() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.js"), "let y = 1;\n").unwrap();

    let script =
        SessionScript::from_text("save\nopen b.js\nredirect\nedit let y=2\nsave\nstatus\n")
            .unwrap();
    let report = SessionRunner::new(dir.path()).run(&script).unwrap();

    assert_eq!(report.transcript.len(), 6);
    assert!(report.transcript[0].contains("failed"));
    assert!(report.transcript[4].contains("failed"));
    assert!(report.transcript[5].contains("overlay edit"));
    assert_eq!(
        fs::read_to_string(dir.path().join("b.js")).unwrap(),
        "let y = 1;\n"
    );
    assert!(report.tabs[0].dirty);
    assert!(report
        .notifications
        .iter()
        .any(|(level, _)| level == "ERROR"));
}

//! Overlay identity contract tests
//!
//! These tests define the stable format of overlay locators.

// ===== Identity Format =====
#[allow(dead_code)]
const SCHEME: &str = "overlay";
#[allow(dead_code)]
const AUTHORITY: &str = "overlay";
#[allow(dead_code)]
const POSIX_EXAMPLE: (&str, &str) = ("/tmp/a.js", "overlay://overlay//tmp/a.js");
#[allow(dead_code)]
const WINDOWS_EXAMPLE: (&str, &str) = ("C:\\src\\main.ts", "overlay://overlay/C:/src/main.ts");

// ===== Contract Tests =====

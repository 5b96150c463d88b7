//! Command and indicator contract tests
//!
//! These tests define the command identifiers and status-bar text the host
//! binds to.

// ===== Command Identifiers =====
#[allow(dead_code)]
const COMMAND_TOGGLE: &str = "toggleRedirect";
#[allow(dead_code)]
const COMMAND_REDIRECT: &str = "redirectActive";

// ===== Indicator Text =====
#[allow(dead_code)]
const LABEL_OFF: &str = "redirect: off";
#[allow(dead_code)]
const LABEL_ON: &str = "redirect: on";
#[allow(dead_code)]
const LABEL_ALREADY_REDIRECTED: &str = "already redirected";

// ===== Timing =====
#[allow(dead_code)]
const POLL_MS: u64 = 550;
#[allow(dead_code)]
const TRANSIENT_MS: u64 = 2000;

// ===== Contract Tests =====

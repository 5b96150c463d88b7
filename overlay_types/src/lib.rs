//! # Overlay Types
//!
//! This crate defines the vocabulary shared by every overlay crate.
//!
//! ## Philosophy
//!
//! - **One source of truth**: Schemes, labels, and rule constants live here
//! - **Plain data**: No I/O, no engine logic, only typed values
//! - **Explicit positions**: Diagnostics are 1-based line/column pairs
//!
//! ## Key Types
//!
//! - [`DocumentUri`]: Locator for a document open in the host editor
//! - [`Diagnostic`]: A single rule violation with message and position
//! - [`FixReport`]: Result of a verify-and-fix pass
//! - [`ValidationReport`]: Result of a verify-only pass
//! - [`RuleConfig`]: The fixed formatting rule set

pub mod config;
pub mod diagnostic;
pub mod uri;

pub use config::{
    is_tracked_extension, BraceStyle, QuoteStyle, RuleConfig, POLL_INTERVAL_MS,
    TRACKED_EXTENSIONS, TRANSIENT_LABEL_MS,
};
pub use diagnostic::{aggregate_diagnostics, Diagnostic, FixReport, Severity, ValidationReport};
pub use uri::{DocumentUri, FILE_SCHEME, OVERLAY_AUTHORITY, OVERLAY_SCHEME};

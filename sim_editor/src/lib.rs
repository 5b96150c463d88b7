//! # Simulated Editor Host
//!
//! A deterministic, in-memory editor that implements [`EditorHost`] so the
//! redirect service and the overlay provider can run end to end without a
//! real editor.
//!
//! ## Philosophy
//!
//! - **Tabs, not windows**: An ordered tab list with one active tab
//! - **Editor-like quirks**: Single-click opens are preview tabs, and a new
//!   preview replaces the old one
//! - **Real I/O at the edges**: `file` tabs read and write the disk, overlay
//!   tabs go through the provider
//! - **Failed saves keep edits**: A rejected save leaves the buffer dirty
//!
//! [`EditorHost`]: services_redirect::EditorHost

pub mod editor;

pub use editor::{SimEditor, Tab};

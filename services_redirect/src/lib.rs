//! # Redirect Service
//!
//! This crate decides when an open real-file document is swapped for its
//! overlay view, and owns the on/off switch for doing so automatically.
//!
//! ## Philosophy
//!
//! - **Single owner**: Only [`ToggleController`] mutates the toggle state,
//!   and only from the toggle command
//! - **At most one poller**: The poll handle lives inside [`ToggleState`],
//!   so a second one cannot exist
//! - **Quiet no-ops**: Ineligible documents are skipped without errors or
//!   notifications
//! - **Host behind a trait**: Everything the editor does goes through
//!   [`EditorHost`]
//!
//! ## Commands
//!
//! - `toggleRedirect`: Turns automatic redirection on or off
//! - `redirectActive`: Redirects the active document once

pub mod command;
pub mod host;
pub mod manual;
pub mod monitor;
pub mod service;
pub mod toggle;

#[cfg(test)]
mod test_utils;

pub use command::CommandId;
pub use host::{DocumentId, EditorHost, HostError, ShowOptions};
pub use manual::{ManualRedirect, ALREADY_REDIRECTED_LABEL, MANUAL_ITEM, MANUAL_LABEL};
pub use monitor::{RedirectMonitor, RedirectOutcome, SkipReason};
pub use service::{RedirectError, RedirectService, READY_MESSAGE};
pub use toggle::{ToggleController, ToggleState, TOGGLE_ITEM, TOGGLE_LABEL_OFF, TOGGLE_LABEL_ON};

//! # Overlay Host Daemon
//!
//! This crate provides the command-line host for the overlay.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: Services never print; the host renders reports
//! - **One-shot first**: `read`, `write`, and `check` run one provider call each
//! - **Deterministic sessions**: Scripted editor sessions run on a manual clock
//! - **Structured logs on stderr**: stdout carries only results
//!
//! ## Commands
//!
//! - `read <PATH>`: Print the auto-fixed content
//! - `write <PATH> [--input FILE]`: Verify and commit content
//! - `check <PATH>`: Verify a file in place
//! - `config`: Print the fixed configuration as JSON
//! - `session --script FILE`: Run a scripted editor session

pub mod cli;
pub mod runtime;
pub mod script;

pub use cli::{Cli, Commands};
pub use runtime::{EffectiveConfig, OverlayRuntime, RuntimeError, SessionReport, SessionRunner};
pub use script::{ScriptError, SessionScript, Step};

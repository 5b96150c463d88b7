//! # Overlay Path Translation
//!
//! This crate maps absolute real-file paths to overlay identities and back.
//!
//! ## Design
//!
//! - An overlay identity is `overlay://overlay/<real path>`
//! - The identity's path component is the real path prefixed with exactly one `/`
//! - Separators are normalized to `/` before encoding
//! - Translation is pure: no filesystem access, no caching
//!
//! The mapping is a bijection over absolute, forward-slash paths:
//! `to_real(to_overlay(p)) == p`.

pub mod path;

pub use path::{OverlayIdentity, PathError, PathTranslator};

//! # Overlay Contract Tests
//!
//! This crate provides "golden" tests for the overlay's external interface
//! to ensure it doesn't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: Every string the host sees is written down here
//! - **Testability first**: Contract tests fail when the interface changes
//! - **Mechanism not policy**: Pin what must be stable, not how it is used
//!
//! ## Structure
//!
//! Each module pins one surface:
//! - Overlay identity format and path translation
//! - Command identifiers and indicator labels
//! - Provider capabilities, error categories, and configuration

pub mod commands;
pub mod identity;
pub mod provider;

/// Common test helpers for contract validation
pub mod test_helpers {
    use serde::Serialize;

    /// Verifies a value serializes to the expected JSON
    pub fn verify_json_contract<T: Serialize>(value: &T, expected: serde_json::Value) {
        let actual = serde_json::to_value(value).expect("Failed to serialize value");
        assert_eq!(
            actual, expected,
            "Serialized form changed: expected {}, got {}",
            expected, actual
        );
    }

    /// Verifies a user-visible string is unchanged
    pub fn verify_text_contract(what: &str, actual: &str, expected: &str) {
        assert_eq!(
            actual, expected,
            "{} changed: expected '{}', got '{}'",
            what, expected, actual
        );
    }
}

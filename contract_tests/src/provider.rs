//! Provider contract tests
//!
//! These tests define what the host sees from the overlay filesystem
//! provider: metadata, no-op capabilities, error categories, and the fixed
//! configuration.

// ===== Provider Constants =====
#[allow(dead_code)]
const STAT_SIZE: u64 = 1;
#[allow(dead_code)]
const TRACKED: [&str; 6] = ["js", "ts", "mjs", "cjs", "mts", "cts"];

// ===== Contract Tests =====

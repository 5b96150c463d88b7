//! Overlay filesystem implementation
//!
//! This module provides the provider that implements fix-on-read and
//! verify-on-write over the real filesystem.

use crate::operations::{
    FileKind, FileStat, ProviderError, VirtualFileProvider, WatchSubscription, PLACEHOLDER_SIZE,
};
use lint_engine::{LintEngine, LintOptions};
use overlay_path::{OverlayIdentity, PathTranslator};
use overlay_types::{FixReport, RuleConfig, ValidationReport};
use services_notification::NotificationHandle;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

/// Notification source for read-side findings
const READ_SOURCE: &str = "overlay::read";

/// Notification source for rejected writes
const WRITE_SOURCE: &str = "overlay::write";

/// The overlay filesystem provider
///
/// Holds the engine, the rule configuration, and the notification channel
/// findings are surfaced on. Holds no per-file state.
pub struct OverlayFileSystem<E: LintEngine> {
    engine: E,
    config: RuleConfig,
    notifications: NotificationHandle,
}

impl<E: LintEngine> OverlayFileSystem<E> {
    /// Creates a provider using the fixed rule set
    pub fn new(engine: E, notifications: NotificationHandle) -> Self {
        Self {
            engine,
            config: RuleConfig::FIXED,
            notifications,
        }
    }

    /// Returns the rule configuration
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Returns the engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs fix-on-read and returns the full report
    ///
    /// Leftover findings are surfaced as one aggregated notification.
    pub fn read_report(&self, id: &OverlayIdentity) -> Result<FixReport, ProviderError> {
        let path = PathTranslator::to_real(id)?;
        let text = read_source(&path)?;
        let report = self
            .engine
            .verify_and_fix(&text, &self.config, file_name(&path));

        tracing::debug!(
            target: "overlay::fs",
            path = %path,
            findings = report.diagnostics.len(),
            changed = report.output != text,
            "read"
        );
        if !report.is_clean() {
            self.notifications
                .notify_diagnostics(READ_SOURCE, &report.diagnostics);
        }
        Ok(report)
    }

    /// Verifies `content` as if it were the text of `real_path`
    ///
    /// Does not notify and does not touch the disk.
    pub fn validate(&self, real_path: &str, content: &str) -> Result<ValidationReport, ProviderError> {
        let options = LintOptions {
            file_path: real_path.to_string(),
            warn_ignored: true,
            config: self.config.clone(),
        };
        let mut results = self.engine.lint_text(content, &options);
        if results.len() != 1 {
            tracing::warn!(
                target: "overlay::fs",
                path = %real_path,
                reports = results.len(),
                "engine contract violated"
            );
            return Err(ProviderError::EngineContractViolation(results.len()));
        }
        let result = results.remove(0);
        Ok(ValidationReport {
            diagnostics: result.diagnostics,
        })
    }

    /// Verifies the real file behind `id` in place
    pub fn check(&self, id: &OverlayIdentity) -> Result<ValidationReport, ProviderError> {
        let path = PathTranslator::to_real(id)?;
        let text = read_source(&path)?;
        self.validate(&path, &text)
    }
}

impl<E: LintEngine> VirtualFileProvider for OverlayFileSystem<E> {
    fn stat(&self, id: &OverlayIdentity) -> Result<FileStat, ProviderError> {
        let path = PathTranslator::to_real(id)?;
        let metadata = fs::metadata(&path).map_err(|err| ProviderError::SourceUnavailable {
            path: path.clone(),
            reason: err.to_string(),
        })?;

        let modified_ms = metadata.modified().map(epoch_ms).unwrap_or(0);
        let created_ms = metadata.created().map(epoch_ms).unwrap_or(modified_ms);
        Ok(FileStat {
            kind: FileKind::File,
            created_ms,
            modified_ms,
            size: PLACEHOLDER_SIZE,
        })
    }

    fn read(&self, id: &OverlayIdentity) -> Result<String, ProviderError> {
        self.read_report(id).map(|report| report.output)
    }

    fn write(&self, id: &OverlayIdentity, content: &str) -> Result<(), ProviderError> {
        let path = PathTranslator::to_real(id)?;
        let report = self.validate(&path, content)?;

        if !report.is_clean() {
            tracing::info!(
                target: "overlay::fs",
                path = %path,
                findings = report.diagnostics.len(),
                "write rejected"
            );
            self.notifications
                .notify_diagnostics(WRITE_SOURCE, &report.diagnostics);
            return Err(ProviderError::UnresolvedViolations {
                path,
                count: report.diagnostics.len(),
            });
        }

        fs::write(&path, content).map_err(|err| ProviderError::CommitFailed {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        tracing::info!(target: "overlay::fs", path = %path, bytes = content.len(), "write committed");
        Ok(())
    }

    fn read_directory(&self, id: &OverlayIdentity) -> Vec<(String, FileKind)> {
        tracing::debug!(target: "overlay::fs", id = %id, "read_directory ignored");
        Vec::new()
    }

    fn create_directory(&self, id: &OverlayIdentity) -> Result<(), ProviderError> {
        tracing::debug!(target: "overlay::fs", id = %id, "create_directory ignored");
        Ok(())
    }

    fn delete(&self, id: &OverlayIdentity) -> Result<(), ProviderError> {
        tracing::debug!(target: "overlay::fs", id = %id, "delete ignored");
        Ok(())
    }

    fn rename(&self, from: &OverlayIdentity, to: &OverlayIdentity) -> Result<(), ProviderError> {
        tracing::debug!(target: "overlay::fs", from = %from, to = %to, "rename ignored");
        Ok(())
    }

    fn copy(&self, from: &OverlayIdentity, to: &OverlayIdentity) -> Result<(), ProviderError> {
        tracing::debug!(target: "overlay::fs", from = %from, to = %to, "copy ignored");
        Ok(())
    }

    fn watch(&self, id: &OverlayIdentity) -> WatchSubscription {
        tracing::debug!(target: "overlay::fs", id = %id, "watch");
        WatchSubscription::new()
    }
}

fn read_source(path: &str) -> Result<String, ProviderError> {
    fs::read_to_string(path).map_err(|err| ProviderError::SourceUnavailable {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

/// Last segment of a forward-slash path, used as the engine's filename hint
fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn epoch_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

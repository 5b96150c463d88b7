//! Provider operations
//!
//! This module defines the capability set the host editor calls on an
//! overlay filesystem provider.

use overlay_path::{OverlayIdentity, PathError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size reported by `stat`
///
/// The host re-reads content through `read`, so the real size is never needed.
pub const PLACEHOLDER_SIZE: u64 = 1;

/// Errors that can occur during provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Identity could not be translated to a real path
    #[error("Invalid identity: {0}")]
    InvalidIdentity(#[from] PathError),

    /// Real file is missing or unreadable
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// Engine returned other than exactly one report for one text
    #[error("Engine returned {0} reports for one text")]
    EngineContractViolation(usize),

    /// Content still has findings; nothing was written
    #[error("Unresolved issues: {count} finding(s) in {path}")]
    UnresolvedViolations { path: String, count: usize },

    /// Content was clean but the disk write failed
    #[error("Commit failed: {path}: {reason}")]
    CommitFailed { path: String, reason: String },
}

impl ProviderError {
    /// Returns the host-facing error category
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::InvalidIdentity(_) => ProviderErrorKind::FileNotFound,
            ProviderError::SourceUnavailable { .. } => ProviderErrorKind::Unavailable,
            ProviderError::EngineContractViolation(_) => ProviderErrorKind::NoPermissions,
            ProviderError::UnresolvedViolations { .. } => ProviderErrorKind::NoPermissions,
            ProviderError::CommitFailed { .. } => ProviderErrorKind::Unavailable,
        }
    }
}

/// Host-facing error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderErrorKind {
    /// The identity names nothing the provider can serve
    FileNotFound,
    /// The backing file cannot be reached right now
    Unavailable,
    /// The operation is refused
    NoPermissions,
}

/// Kind of object behind an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Directory,
}

/// Metadata returned by `stat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Object kind (always `File` for overlay documents)
    pub kind: FileKind,
    /// Creation time, milliseconds since the Unix epoch
    pub created_ms: u64,
    /// Modification time, milliseconds since the Unix epoch
    pub modified_ms: u64,
    /// Placeholder size
    pub size: u64,
}

/// Subscription returned by `watch`
///
/// The overlay never reports changes; disposing is a no-op.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WatchSubscription {
    disposed: bool,
}

impl WatchSubscription {
    /// Creates a subscription that never fires
    pub fn new() -> Self {
        Self::default()
    }

    /// Disposes the subscription
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Returns true once disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Virtual filesystem provider
///
/// The full capability set a host expects from a registered provider.
/// Calls are serialized by the host; implementations take `&self`.
pub trait VirtualFileProvider {
    /// Returns metadata for the identity
    fn stat(&self, id: &OverlayIdentity) -> Result<FileStat, ProviderError>;

    /// Returns the content to display for the identity
    fn read(&self, id: &OverlayIdentity) -> Result<String, ProviderError>;

    /// Commits content for the identity
    fn write(&self, id: &OverlayIdentity, content: &str) -> Result<(), ProviderError>;

    /// Lists a directory
    fn read_directory(&self, id: &OverlayIdentity) -> Vec<(String, FileKind)>;

    /// Creates a directory
    fn create_directory(&self, id: &OverlayIdentity) -> Result<(), ProviderError>;

    /// Deletes an object
    fn delete(&self, id: &OverlayIdentity) -> Result<(), ProviderError>;

    /// Renames an object
    fn rename(&self, from: &OverlayIdentity, to: &OverlayIdentity) -> Result<(), ProviderError>;

    /// Copies an object
    fn copy(&self, from: &OverlayIdentity, to: &OverlayIdentity) -> Result<(), ProviderError>;

    /// Subscribes to changes under the identity
    fn watch(&self, id: &OverlayIdentity) -> WatchSubscription;
}

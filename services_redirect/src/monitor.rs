//! Redirect monitor
//!
//! One tick of the automatic redirect: look at the active document and, if
//! it is an eligible real file, swap it for its overlay view.

use crate::host::{EditorHost, ShowOptions};
use crate::service::RedirectError;
use overlay_path::{OverlayIdentity, PathTranslator};
use overlay_types::{is_tracked_extension, DocumentUri};
use serde::{Deserialize, Serialize};

/// Why a document was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Nothing is active
    NoActiveDocument,
    /// Active document is already an overlay view
    AlreadyOverlay,
    /// Active document is not a real file
    NotFileScheme,
    /// Extension is not tracked
    UntrackedExtension,
    /// No absolute real path can be derived
    NoRealPath,
}

/// Result of one redirect attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The real view was closed and the overlay view shown
    Redirected {
        from: DocumentUri,
        to: OverlayIdentity,
    },
    /// Nothing happened
    Skipped(SkipReason),
}

impl RedirectOutcome {
    /// Returns true if a redirect happened
    pub fn is_redirected(&self) -> bool {
        matches!(self, RedirectOutcome::Redirected { .. })
    }
}

/// Redirect monitor
pub struct RedirectMonitor;

impl RedirectMonitor {
    /// Checks whether `uri` may be redirected automatically
    ///
    /// Returns the overlay identity to open on success.
    pub fn eligibility(uri: &DocumentUri) -> Result<OverlayIdentity, SkipReason> {
        if uri.is_overlay() {
            return Err(SkipReason::AlreadyOverlay);
        }
        if !uri.is_file() {
            return Err(SkipReason::NotFileScheme);
        }
        if !uri.extension().is_some_and(is_tracked_extension) {
            return Err(SkipReason::UntrackedExtension);
        }
        resolve(uri)
    }

    /// Runs one tick against the host
    ///
    /// At most one redirect happens per tick.
    pub fn tick(host: &mut dyn EditorHost) -> Result<RedirectOutcome, RedirectError> {
        let Some(uri) = host.active_document() else {
            return Ok(RedirectOutcome::Skipped(SkipReason::NoActiveDocument));
        };
        match Self::eligibility(&uri) {
            Ok(identity) => redirect(host, uri, identity),
            Err(reason) => {
                tracing::trace!(target: "overlay::redirect", uri = %uri, ?reason, "tick skipped");
                Ok(RedirectOutcome::Skipped(reason))
            }
        }
    }
}

/// Derives the overlay identity of a real-file document
pub(crate) fn resolve(uri: &DocumentUri) -> Result<OverlayIdentity, SkipReason> {
    let path = uri.fs_path().ok_or(SkipReason::NoRealPath)?;
    PathTranslator::to_overlay(&path).map_err(|_| SkipReason::NoRealPath)
}

/// Closes the active view and shows the overlay view in its place
pub(crate) fn redirect(
    host: &mut dyn EditorHost,
    from: DocumentUri,
    to: OverlayIdentity,
) -> Result<RedirectOutcome, RedirectError> {
    host.close_active()?;
    let id = host.open_document(&to.to_uri())?;
    host.show_document(id, ShowOptions { preview: false })?;
    tracing::info!(target: "overlay::redirect", from = %from, to = %to, "redirected");
    Ok(RedirectOutcome::Redirected { from, to })
}

//! Path translation logic
//!
//! This module converts between real paths and overlay identities.

use overlay_types::{DocumentUri, OVERLAY_AUTHORITY, OVERLAY_SCHEME};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during translation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Identity is not a well-formed overlay locator
    #[error("Invalid overlay identity: {0}")]
    InvalidIdentity(String),

    /// Real path is not absolute
    #[error("Not an absolute path: {0}")]
    NotAbsolute(String),
}

/// Overlay identity
///
/// Stands in for a real file path inside the host editor. Scheme and
/// authority are fixed; only the path varies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlayIdentity {
    path: String,
}

impl OverlayIdentity {
    /// Builds an identity from a host locator
    ///
    /// Only scheme and authority are checked here; the path segment is
    /// validated when translating back with [`PathTranslator::to_real`].
    pub fn from_uri(uri: &DocumentUri) -> Result<Self, PathError> {
        if uri.scheme != OVERLAY_SCHEME {
            return Err(PathError::InvalidIdentity(format!(
                "expected scheme '{}', found '{}'",
                OVERLAY_SCHEME, uri.scheme
            )));
        }
        if uri.authority != OVERLAY_AUTHORITY {
            return Err(PathError::InvalidIdentity(format!(
                "expected authority '{}', found '{}'",
                OVERLAY_AUTHORITY, uri.authority
            )));
        }
        Ok(Self {
            path: uri.path.clone(),
        })
    }

    /// Parses the textual form `overlay://overlay/<real path>`
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let uri = DocumentUri::parse(text)
            .ok_or_else(|| PathError::InvalidIdentity(format!("not a locator: {}", text)))?;
        Self::from_uri(&uri)
    }

    /// Returns the fixed scheme
    pub fn scheme(&self) -> &'static str {
        OVERLAY_SCHEME
    }

    /// Returns the fixed authority
    pub fn authority(&self) -> &'static str {
        OVERLAY_AUTHORITY
    }

    /// Returns the encoded path component
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Converts to a host locator
    pub fn to_uri(&self) -> DocumentUri {
        DocumentUri::new(OVERLAY_SCHEME, OVERLAY_AUTHORITY, self.path.clone())
    }
}

impl fmt::Display for OverlayIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", OVERLAY_SCHEME, OVERLAY_AUTHORITY, self.path)
    }
}

/// Path translator
///
/// Stateless; every call constructs a fresh identity or path.
pub struct PathTranslator;

impl PathTranslator {
    /// Translates an absolute real path to its overlay identity
    ///
    /// # Examples
    ///
    /// ```
    /// use overlay_path::PathTranslator;
    ///
    /// let id = PathTranslator::to_overlay("/tmp/a.js").unwrap();
    /// assert_eq!(id.to_string(), "overlay://overlay//tmp/a.js");
    ///
    /// let id = PathTranslator::to_overlay("C:\\src\\main.ts").unwrap();
    /// assert_eq!(id.to_string(), "overlay://overlay/C:/src/main.ts");
    /// ```
    pub fn to_overlay(real_path: &str) -> Result<OverlayIdentity, PathError> {
        let normalized = Self::normalize(real_path);
        if !Self::is_absolute(&normalized) {
            return Err(PathError::NotAbsolute(real_path.to_string()));
        }
        Ok(OverlayIdentity {
            path: format!("/{}", normalized),
        })
    }

    /// Translates an overlay identity back to its real path
    ///
    /// Strips exactly one leading separator so the round trip never
    /// duplicates or drops one.
    pub fn to_real(identity: &OverlayIdentity) -> Result<String, PathError> {
        let real = identity.path.strip_prefix('/').ok_or_else(|| {
            PathError::InvalidIdentity(format!("path segment missing: '{}'", identity.path))
        })?;

        if real.is_empty() {
            return Err(PathError::InvalidIdentity(
                "path segment is empty".to_string(),
            ));
        }
        if !Self::is_absolute(real) {
            return Err(PathError::InvalidIdentity(format!(
                "path segment is not absolute: '{}'",
                real
            )));
        }

        Ok(real.to_string())
    }

    /// Normalizes platform separators to `/`
    pub fn normalize(path: &str) -> String {
        path.replace('\\', "/")
    }

    /// Returns true for `/...` and drive-letter `X:/...` paths
    pub fn is_absolute(path: &str) -> bool {
        if path.starts_with('/') {
            return true;
        }
        let bytes = path.as_bytes();
        bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
    }
}

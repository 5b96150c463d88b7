//! Document locators
//!
//! The host editor addresses documents by `scheme://authority/path`. Real
//! files use the `file` scheme with an empty authority; overlay views use the
//! fixed `overlay` scheme and authority.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Scheme of documents backed directly by the real filesystem
pub const FILE_SCHEME: &str = "file";

/// Scheme of documents served through the overlay filesystem
pub const OVERLAY_SCHEME: &str = "overlay";

/// Authority of every overlay document
pub const OVERLAY_AUTHORITY: &str = "overlay";

/// A document locator as seen by the host editor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentUri {
    /// Scheme tag (`file`, `overlay`, `untitled`, ...)
    pub scheme: String,
    /// Authority component (empty for real files)
    pub authority: String,
    /// Path component, always starting with `/` when non-empty
    pub path: String,
}

impl DocumentUri {
    /// Creates a new locator from its parts
    pub fn new(
        scheme: impl Into<String>,
        authority: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            path: path.into(),
        }
    }

    /// Creates a real-file locator for an absolute path
    ///
    /// Backslashes are normalized to forward slashes. Drive-letter paths
    /// (`C:/src/a.ts`) get a leading `/` in the path component, the same way
    /// editors encode them.
    pub fn file(path: &str) -> Self {
        let normalized = path.replace('\\', "/");
        let path = if normalized.starts_with('/') || normalized.is_empty() {
            normalized
        } else {
            format!("/{}", normalized)
        };
        Self::new(FILE_SCHEME, "", path)
    }

    /// Parses `scheme://authority/path` or `scheme:path`
    ///
    /// Returns `None` if there is no scheme separator.
    pub fn parse(text: &str) -> Option<Self> {
        let (scheme, rest) = text.split_once(':')?;
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        {
            return None;
        }

        match rest.strip_prefix("//") {
            Some(after) => {
                let (authority, path) = match after.find('/') {
                    Some(pos) => (&after[..pos], &after[pos..]),
                    None => (after, ""),
                };
                Some(Self::new(scheme, authority, path))
            }
            None => Some(Self::new(scheme, "", rest)),
        }
    }

    /// Returns true if this document lives on the real filesystem
    pub fn is_file(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    /// Returns true if this document is an overlay view
    pub fn is_overlay(&self) -> bool {
        self.scheme == OVERLAY_SCHEME
    }

    /// Returns the real filesystem path for `file` locators
    ///
    /// `/C:/src/a.ts` resolves to `C:/src/a.ts`; POSIX paths are returned
    /// as-is. Other schemes and empty paths have no filesystem path.
    pub fn fs_path(&self) -> Option<String> {
        if !self.is_file() || self.path.is_empty() {
            return None;
        }
        let bytes = self.path.as_bytes();
        if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':'
        {
            return Some(self.path[1..].to_string());
        }
        Some(self.path.clone())
    }

    /// Returns the file extension of the last path segment, if any
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        let dot = name.rfind('.')?;
        if dot == 0 || dot + 1 == name.len() {
            return None;
        }
        Some(&name[dot + 1..])
    }

    /// Returns the last path segment
    pub fn file_name(&self) -> Option<&str> {
        let name = self.path.rsplit('/').next()?;
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_uri_from_posix_path() {
        let uri = DocumentUri::file("/tmp/a.js");
        assert_eq!(uri.scheme, FILE_SCHEME);
        assert_eq!(uri.authority, "");
        assert_eq!(uri.path, "/tmp/a.js");
        assert_eq!(uri.fs_path(), Some("/tmp/a.js".to_string()));
        assert_eq!(uri.to_string(), "file:///tmp/a.js");
    }

    #[test]
    fn test_file_uri_from_windows_path() {
        let uri = DocumentUri::file("C:\\src\\main.ts");
        assert_eq!(uri.path, "/C:/src/main.ts");
        assert_eq!(uri.fs_path(), Some("C:/src/main.ts".to_string()));
    }

    #[test]
    fn test_parse_with_authority() {
        let uri = DocumentUri::parse("overlay://overlay//tmp/a.js").unwrap();
        assert_eq!(uri.scheme, "overlay");
        assert_eq!(uri.authority, "overlay");
        assert_eq!(uri.path, "//tmp/a.js");
        assert!(uri.is_overlay());
        assert_eq!(uri.fs_path(), None);
    }

    #[test]
    fn test_parse_without_authority() {
        let uri = DocumentUri::parse("untitled:Untitled-1").unwrap();
        assert_eq!(uri.scheme, "untitled");
        assert_eq!(uri.path, "Untitled-1");
        assert!(!uri.is_file());
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert!(DocumentUri::parse("/tmp/a.js").is_none());
        assert!(DocumentUri::parse("://x/y").is_none());
    }

    #[test]
    fn test_display_roundtrip() {
        let text = "overlay://overlay//home/dev/app.ts";
        assert_eq!(DocumentUri::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_extension() {
        assert_eq!(DocumentUri::file("/a/b/c.ts").extension(), Some("ts"));
        assert_eq!(DocumentUri::file("/a/b/archive.tar.gz").extension(), Some("gz"));
        assert_eq!(DocumentUri::file("/a/b/Makefile").extension(), None);
        assert_eq!(DocumentUri::file("/a/b/.eslintrc").extension(), None);
        assert_eq!(DocumentUri::file("/a/b.d/file").extension(), None);
    }
}

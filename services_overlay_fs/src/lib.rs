//! # Overlay Filesystem Service
//!
//! This service serves real source files through the overlay scheme with
//! asymmetric semantics: reads are auto-fixed, writes are verified.
//!
//! ## Philosophy
//!
//! - Reads are best-effort: the fixed text is always returned, leftover
//!   findings are surfaced as one notification
//! - Writes are strict: any finding rejects the write and the real file is
//!   left untouched
//! - Every operation is independent: nothing is cached between calls
//! - Unsupported capabilities are explicit no-ops, never errors
//!
//! ## Operations
//!
//! - `stat(id)`: Real file timestamps with a placeholder size
//! - `read(id)`: Fix-on-read
//! - `write(id, content)`: Verify-on-write, commit verbatim when clean
//! - `read_directory`, `create_directory`, `delete`, `rename`, `copy`: No-ops
//! - `watch(id)`: A subscription that never fires

pub mod operations;
pub mod service;

pub use operations::{
    FileKind, FileStat, ProviderError, ProviderErrorKind, VirtualFileProvider,
    WatchSubscription, PLACEHOLDER_SIZE,
};
pub use service::OverlayFileSystem;

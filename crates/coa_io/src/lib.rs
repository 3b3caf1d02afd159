//! crates/coa_io/src/lib.rs
//! I/O boundary of the COA engine.
//!
//! - `canonical_json`: sorted-key compact bytes + atomic file writes
//! - `hasher`: SHA-256 over raw or canonical bytes, analyte-list fingerprints
//! - `loader`: request / record / batch-document readers and writers
//!
//! Everything here returns `IoError`; nothing panics on bad input.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for coa_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, size limit).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with a JSON Pointer to the offending node.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Hashing-related errors (feature disabled, canonicalization failure).
    #[error("hash error: {0}")]
    Hash(String),

    /// Input parsed but does not describe what was expected.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; callers that know the node re-wrap.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
#[cfg(feature = "hash")]
pub mod hasher;
pub mod loader;

/// Compute SHA-256 hex of `bytes`, or fail when hashing is compiled out.
pub fn try_sha256_hex(bytes: &[u8]) -> IoResult<String> {
    #[cfg(feature = "hash")]
    {
        Ok(crate::hasher::sha256_hex(bytes))
    }
    #[cfg(not(feature = "hash"))]
    {
        let _ = bytes;
        Err(IoError::Hash("hash feature disabled".into()))
    }
}

pub mod prelude {
    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file, write_pretty_file};
    #[cfg(feature = "hash")]
    pub use crate::hasher::{cannabinoid_fingerprint, sha256_canonical, sha256_hex};
    pub use crate::loader::{load_generation_request, load_json, load_records, BatchDocument};
    pub use crate::{try_sha256_hex, IoError, IoResult};
}

//! crates/coa_io/src/hasher.rs
//!
//! SHA-256 digests, lowercase hex.
//!
//! - `sha256_hex` / `sha256_file`: raw bytes.
//! - `sha256_canonical`: any serializable value, through canonical JSON.
//! - `cannabinoid_fingerprint`: digest of an analyte list, used by the
//!   uniqueness check to spot two records with identical cannabinoid values.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use coa_core::AnalyteResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoResult;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over a file's raw bytes.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let mut r = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = r.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 over **canonical JSON bytes** of any serializable value.
pub fn sha256_canonical<T: Serialize + ?Sized>(value: &T) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// Fingerprint of an analyte list. Order-sensitive; lists built by the engine
/// are always in vocabulary order.
pub fn cannabinoid_fingerprint(analytes: &[AnalyteResult]) -> IoResult<String> {
    sha256_canonical(analytes)
}

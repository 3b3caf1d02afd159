//! coa_pipeline — orchestration surface of the COA engine.
//!
//! - `validate`: the single-pass Validation Engine (formula, logic, uniqueness)
//! - `batch`: seeded batch generation and sequential batch validation
//!
//! Generation math lives in `coa_algo`; JSON, hashing and files in `coa_io`.
//! Errors surface as one `CoaError { kind, message }`; validation itself never
//! fails, every finding becomes a report entry.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod batch;
pub mod validate;

pub use batch::{generate_batch, validate_batch, BatchRequest, MAX_BATCH_SIZE};
pub use validate::{
    validate, validate_profile, FormulaCheck, IssueKind, LogicCheck, Severity, UniquenessCheck,
    UniquenessPolicy, ValidationIssue, ValidationOptions, ValidationReport,
};

/// Error category carried by every `CoaError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller input the engine cannot default around (batch size, empty strain list).
    #[serde(rename = "validation")]
    Validation,
    #[serde(rename = "generation")]
    Generation,
    /// Serialization, hashing, or file output.
    #[serde(rename = "export")]
    Export,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Generation => "generation",
            ErrorKind::Export => "export",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single error surface for the engine's fallible entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct CoaError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CoaError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }
}

impl From<coa_io::IoError> for CoaError {
    fn from(e: coa_io::IoError) -> Self {
        CoaError::new(ErrorKind::Export, e.to_string())
    }
}

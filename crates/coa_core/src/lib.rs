//! coa_core — Core types, domains, rounding helpers, and the sampling RNG.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! engine (`coa_algo`, `coa_io`, `coa_pipeline`, `coa_cli`).
//!
//! - Analyte vocabulary (`Analyte`) and detection status (`DetectionStatus`)
//! - Caller-facing domains: `ProfileType`, `ProductType`, `ProductClass`
//! - Immutable records: `AnalyteResult`, `PotencyProfile`, `CoaRecord`
//! - Rounding helpers (fixed decimal places, tolerance compare)
//! - Injectable RNG (`PotencyRng`) with a seedable ChaCha20 implementation
//!
//! Serialization derives are gated behind the `serde` feature. Wire tokens are
//! declared once per enum (see `wire_enum!`) and are what downstream renderers
//! key off, so they must not drift.

#![forbid(unsafe_code)]

/// Fixed multiplier converting an acidic cannabinoid (THCa, CBDa) into the
/// mass fraction of its decarboxylated form.
pub const DECARB_FACTOR: f64 = 0.877;

/// Define a closed enum with explicit wire tokens plus `as_str`/`Display`/`FromStr`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable wire token.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = crate::errors::CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let t = s.trim();
                $(
                    if t == $token { return Ok($name::$variant); }
                )+
                Err(crate::errors::CoreError::UnknownToken(stringify!($name)))
            }
        }
    };
}

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        /// Token did not match any wire token of the named enum.
        UnknownToken(&'static str),
        /// Numeric input outside its domain (NaN, infinite, negative).
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::UnknownToken(k) => write!(f, "unknown {k} token"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod analytes;
pub mod records;
pub mod rng;
pub mod rounding;
pub mod variables;

pub use analytes::{Analyte, ConcentrationRange, DetectionLimits, DetectionStatus};
pub use errors::CoreError;
pub use records::{AnalyteResult, CoaRecord, PotencyProfile, PotencyTotals};
pub use rng::{PotencyRng, SampleRng};
pub use variables::{CustomRanges, GenerationRequest, ProductClass, ProductType, ProfileType};

// crates/coa_algo/src/lib.rs
//! Algorithm layer of the COA engine. Pure functions over `coa_core` records:
//!
//! - `ranges`    — static Range Table (profile → analyte ranges) and LOD/LOQ tables
//! - `sampler`   — one analyte draw with detection-status semantics
//! - `generate`  — full profile for a profile type / product class
//! - `aggregate` — total THC / CBD / detected-sum formulas
//! - `dosage`    — edible dose (mg) + sample mass → single-analyte profile
//!
//! No I/O; the only randomness is the `PotencyRng` the caller passes in.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod dosage;
pub mod generate;
pub mod ranges;
pub mod sampler;

pub use aggregate::{compute_totals, total_cbd, total_detected, total_thc};
pub use dosage::{convert_dosage, parse_sample_mass_mg, DEFAULT_SAMPLE_MASS_MG};
pub use generate::{generate_for_request, generate_profile, generate_seeded};
pub use ranges::{limits_for, limits_for_name, range_row, RangeRow};
pub use sampler::{sample, Sample};

// crates/coa_algo/src/aggregate.rs
//! Potency Aggregator: reported totals from an analyte list.
//!
//! - `totalTHC = Δ9-THC + 0.877 × THCa`
//! - `totalCBD = CBD + 0.877 × CBDa`
//! - `totalCannabinoids = Σ percentWeight over analytes whose result is `detected``
//!
//! The validator re-derives totals through these same functions, so the
//! detected-only rule cannot drift between generation and validation.
//! Totals are not rounded.

use coa_core::{Analyte, AnalyteResult, PotencyTotals, DECARB_FACTOR};

/// Reported % of the first analyte with this name (0 when absent).
pub fn percent_of(analytes: &[AnalyteResult], name: Analyte) -> f64 {
    analytes
        .iter()
        .find(|a| a.name() == name)
        .map(|a| a.percent_weight())
        .unwrap_or(0.0)
}

pub fn total_thc(analytes: &[AnalyteResult]) -> f64 {
    percent_of(analytes, Analyte::D9Thc) + DECARB_FACTOR * percent_of(analytes, Analyte::Thca)
}

pub fn total_cbd(analytes: &[AnalyteResult]) -> f64 {
    percent_of(analytes, Analyte::Cbd) + DECARB_FACTOR * percent_of(analytes, Analyte::Cbda)
}

/// Sum over `detected` analytes only; `ND` and `< LOQ` are excluded.
/// Starts from `+0.0` so an empty sum never serializes as `-0.0`.
pub fn total_detected(analytes: &[AnalyteResult]) -> f64 {
    analytes
        .iter()
        .filter(|a| a.is_detected())
        .fold(0.0, |acc, a| acc + a.percent_weight())
}

pub fn compute_totals(analytes: &[AnalyteResult]) -> PotencyTotals {
    PotencyTotals {
        total_thc: total_thc(analytes),
        total_cbd: total_cbd(analytes),
        total_cannabinoids: total_detected(analytes),
    }
}

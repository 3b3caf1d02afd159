// crates/coa_algo/src/dosage.rs
//! Edible Dosage Converter: absolute dose (mg) + sample mass → one-analyte profile.
//!
//! Sample mass grammar (whitespace and case ignored): `^([\d.]+)(mg|g)?$`.
//! `mg` is taken literally; `g` or no unit is multiplied by 1000. Anything else
//! (including a zero mass) is a soft failure: warning + `DEFAULT_SAMPLE_MASS_MG`.
//!
//! Δ9-THC % = dose / mass × 100, rounded to 3 decimals. Every other analyte is `ND`
//! with edible limits. Totals are pinned to the reported Δ9-THC value:
//! `totalTHC == totalCannabinoids == Δ9-THC %` and `totalCBD == 0`, including for
//! a `< LOQ` dose (the detected-only re-derivation then differs by less than LOQ).

use coa_core::rounding::{round_to, EDIBLE_D9_DECIMALS};
use coa_core::{Analyte, AnalyteResult, PotencyProfile, PotencyTotals, ProductClass};

use crate::ranges::limits_for;
use crate::sampler::Sample;

/// 3.5 g, used when the sample mass cannot be parsed.
pub const DEFAULT_SAMPLE_MASS_MG: f64 = 3500.0;

/// Parse a sample-mass string into milligrams. `None` when it does not match.
pub fn parse_sample_mass_mg(s: &str) -> Option<f64> {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    let (number, factor) = if let Some(n) = compact.strip_suffix("mg") {
        (n, 1.0)
    } else if let Some(n) = compact.strip_suffix('g') {
        (n, 1000.0)
    } else {
        (compact.as_str(), 1000.0)
    };

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = number.parse().ok()?;
    let mg = value * factor;
    if mg.is_finite() && mg > 0.0 {
        Some(mg)
    } else {
        None
    }
}

/// Parsed mass, or the default with a warning.
pub fn sample_mass_mg_or_default(s: &str) -> f64 {
    parse_sample_mass_mg(s).unwrap_or_else(|| {
        tracing::warn!(
            "unparsable sample mass '{}', defaulting to {} mg",
            s,
            DEFAULT_SAMPLE_MASS_MG
        );
        DEFAULT_SAMPLE_MASS_MG
    })
}

/// Convert an edible dose into a profile with Δ9-THC as the only present analyte.
pub fn convert_dosage(dose_mg: f64, sample_mass: &str) -> PotencyProfile {
    let dose = if dose_mg.is_finite() && dose_mg >= 0.0 {
        dose_mg
    } else {
        tracing::warn!("invalid edible dose {}, using 0 mg", dose_mg);
        0.0
    };
    let mass_mg = sample_mass_mg_or_default(sample_mass);
    let percent = round_to(dose / mass_mg * 100.0, EDIBLE_D9_DECIMALS);

    let cannabinoids: Vec<AnalyteResult> = Analyte::ALL
        .iter()
        .map(|&analyte| {
            let limits = limits_for(analyte, ProductClass::Edible);
            match analyte {
                Analyte::D9Thc => Sample::classify(percent, limits).into_result(analyte, limits),
                _ => AnalyteResult::not_detected(analyte, limits),
            }
        })
        .collect();

    let d9 = cannabinoids
        .iter()
        .find(|a| a.name() == Analyte::D9Thc)
        .map_or(0.0, |a| a.percent_weight());
    let totals = PotencyTotals {
        total_thc: d9,
        total_cbd: 0.0,
        total_cannabinoids: d9,
    };
    PotencyProfile::new(cannabinoids, totals).with_edible_context(dose, sample_mass.trim())
}

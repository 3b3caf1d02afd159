// crates/coa_algo/src/generate.rs
//! Profile Generator: one full analyte panel for a profile type and product class.
//!
//! Per-analyte rules, applied in vocabulary order (`Analyte::ALL`):
//! - THCa / Δ9-THC: always sampled (p = 1) from the row range, or from the caller's
//!   custom bounds when given.
//! - CBGa / CBG: forced-`ND` chance (15% / 25%), then a jittered draw
//!   (`uniform(range) × uniform(0.6, 1.4)`) clamped to fixed bounds.
//! - Analytes pinned by the row beyond those (hemp CBDa / CBD) are sampled from the
//!   row; hemp CBD bypasses the forced-`ND` rule and is present 70% of the time.
//! - Everything else: trace range, 25% presence, forced-`ND` rule on flower.
//!
//! Totals come from `aggregate::compute_totals`; generation is pure given the RNG.

use coa_core::rounding::round_to;
use coa_core::{
    Analyte, AnalyteResult, ConcentrationRange, CustomRanges, GenerationRequest, PotencyProfile,
    PotencyRng, ProductClass, ProfileType, SampleRng,
};

use crate::aggregate::compute_totals;
use crate::dosage::convert_dosage;
use crate::ranges::{limits_for, range_row, RangeRow, TRACE_RANGE};
use crate::sampler::{decimals_for, draw, sample, Sample};

/// Sample mass assumed for an edible dose when the request names none.
pub const DEFAULT_SAMPLE_SIZE: &str = "3.5g";

const PRIMARY_P: f64 = 1.0;
const TRACE_P: f64 = 0.25;
const HEMP_CBD_P: f64 = 0.7;

const CBGA_FORCED_ND: f64 = 0.15;
const CBG_FORCED_ND: f64 = 0.25;
const JITTER: (f64, f64) = (0.6, 1.4);
const CBGA_CLAMP: ConcentrationRange = ConcentrationRange::new(0.1, 1.5);
const CBG_CLAMP: ConcentrationRange = ConcentrationRange::new(0.02, 0.45);

// ------------------------------------------------------------------------------------------------
// Range resolution
// ------------------------------------------------------------------------------------------------

fn usable_bound(bound: Option<f64>, fallback: f64, label: &str) -> f64 {
    match bound {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(v) => {
            tracing::warn!("ignoring invalid custom bound {} = {}", label, v);
            fallback
        }
        None => fallback,
    }
}

/// Merge caller bounds with a table range. Inverted bounds are swapped.
fn resolve_range(
    analyte: Analyte,
    custom: (Option<f64>, Option<f64>),
    table: ConcentrationRange,
) -> ConcentrationRange {
    let min = usable_bound(custom.0, table.min, "min");
    let max = usable_bound(custom.1, table.max, "max");
    if min > max {
        tracing::warn!(
            "custom range for {} has min {} > max {}, swapping",
            analyte,
            min,
            max
        );
        ConcentrationRange::new(max, min)
    } else {
        ConcentrationRange::new(min, max)
    }
}

// ------------------------------------------------------------------------------------------------
// Per-analyte draws
// ------------------------------------------------------------------------------------------------

fn jittered<R: PotencyRng + ?Sized>(
    rng: &mut R,
    analyte: Analyte,
    range: ConcentrationRange,
    forced_nd: f64,
    clamp: ConcentrationRange,
    class: ProductClass,
) -> Sample {
    if rng.chance(forced_nd) {
        return Sample::NOT_DETECTED;
    }
    let base = rng.uniform(range.min, range.max);
    let factor = rng.uniform(JITTER.0, JITTER.1);
    let value = round_to(clamp.clamp(base * factor), decimals_for(analyte, class));
    Sample::classify(value, limits_for(analyte, class))
}

fn draw_analyte<R: PotencyRng + ?Sized>(
    rng: &mut R,
    analyte: Analyte,
    row: &RangeRow,
    class: ProductClass,
    custom: Option<&CustomRanges>,
) -> Sample {
    let custom = custom.copied().unwrap_or_default();
    match analyte {
        Analyte::Thca => {
            let range = resolve_range(analyte, custom.thca(), row.thca);
            sample(rng, analyte, range, PRIMARY_P, class)
        }
        Analyte::D9Thc => {
            let range = resolve_range(analyte, custom.d9thc(), row.d9thc);
            sample(rng, analyte, range, PRIMARY_P, class)
        }
        Analyte::Cbga => jittered(rng, analyte, row.cbga, CBGA_FORCED_ND, CBGA_CLAMP, class),
        Analyte::Cbg => jittered(rng, analyte, row.cbg, CBG_FORCED_ND, CBG_CLAMP, class),
        Analyte::Cbd if row.profile_type == ProfileType::Hemp => {
            let range = row.range(analyte).unwrap_or(TRACE_RANGE);
            draw(rng, analyte, range, HEMP_CBD_P, class)
        }
        other => match row.range(other) {
            Some(range) => sample(rng, other, range, PRIMARY_P, class),
            None => sample(rng, other, TRACE_RANGE, TRACE_P, class),
        },
    }
}

// ------------------------------------------------------------------------------------------------
// Entry points
// ------------------------------------------------------------------------------------------------

/// Generate a full profile from the given random source.
pub fn generate_profile<R: PotencyRng + ?Sized>(
    rng: &mut R,
    profile_type: ProfileType,
    class: ProductClass,
    custom: Option<&CustomRanges>,
) -> PotencyProfile {
    let row = range_row(profile_type);
    let cannabinoids: Vec<AnalyteResult> = Analyte::ALL
        .iter()
        .map(|&analyte| {
            let limits = limits_for(analyte, class);
            draw_analyte(rng, analyte, row, class, custom).into_result(analyte, limits)
        })
        .collect();
    let totals = compute_totals(&cannabinoids);
    PotencyProfile::new(cannabinoids, totals)
}

/// Generate with a stream derived from `seed_hint`, or from OS entropy when absent.
pub fn generate_seeded(
    profile_type: ProfileType,
    class: ProductClass,
    custom: Option<&CustomRanges>,
    seed_hint: Option<u64>,
) -> PotencyProfile {
    let mut rng = match seed_hint {
        Some(hint) => SampleRng::from_seed_hint(hint),
        None => SampleRng::from_entropy(),
    };
    generate_profile(&mut rng, profile_type, class, custom)
}

/// Dispatch a caller request: edible doses go to the dosage converter, everything
/// else to the sampler.
pub fn generate_for_request<R: PotencyRng + ?Sized>(
    request: &GenerationRequest,
    rng: &mut R,
) -> PotencyProfile {
    if let (true, Some(dose)) = (request.uses_dosage(), request.edible_dosage) {
        let mass = request.sample_size.as_deref().unwrap_or(DEFAULT_SAMPLE_SIZE);
        return convert_dosage(dose, mass);
    }
    generate_profile(
        rng,
        request.resolved_profile_type(),
        request.product_class(),
        request.custom_ranges.as_ref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coa_core::DetectionStatus;

    #[test]
    fn panel_covers_vocabulary_in_order() {
        let p = generate_seeded(ProfileType::HighThc, ProductClass::Flower, None, Some(1));
        let names: Vec<Analyte> = p.cannabinoids().iter().map(|a| a.name()).collect();
        assert_eq!(names, Analyte::ALL.to_vec());
    }

    #[test]
    fn totals_match_aggregator() {
        for hint in 0..50 {
            let p = generate_seeded(ProfileType::MediumThc, ProductClass::Flower, None, Some(hint));
            assert_eq!(p.totals(), compute_totals(p.cannabinoids()));
        }
    }

    #[test]
    fn same_hint_same_profile() {
        let a = generate_seeded(ProfileType::Concentrate, ProductClass::Flower, None, Some(42));
        let b = generate_seeded(ProfileType::Concentrate, ProductClass::Flower, None, Some(42));
        assert_eq!(a, b);
    }

    #[test]
    fn custom_bounds_override_and_swap() {
        let custom = CustomRanges { thca_min: Some(20.0), thca_max: Some(18.0), ..Default::default() };
        for hint in 0..100 {
            let p = generate_seeded(ProfileType::HighThc, ProductClass::Flower, Some(&custom), Some(hint));
            let thca = p.analyte(Analyte::Thca).unwrap().percent_weight();
            assert!((18.0..=20.0).contains(&thca), "{thca}");
        }
    }

    #[test]
    fn half_specified_custom_range_keeps_table_bound() {
        let r = resolve_range(Analyte::D9Thc, (Some(0.2), None), ConcentrationRange::new(0.05, 0.29));
        assert_eq!(r, ConcentrationRange::new(0.2, 0.29));
        let nan = resolve_range(Analyte::D9Thc, (Some(f64::NAN), None), ConcentrationRange::new(0.05, 0.29));
        assert_eq!(nan, ConcentrationRange::new(0.05, 0.29));
    }

    #[test]
    fn cbga_and_cbg_stay_within_clamps() {
        for hint in 0..300 {
            let p = generate_seeded(ProfileType::Concentrate, ProductClass::Flower, None, Some(hint));
            let cbga = p.analyte(Analyte::Cbga).unwrap();
            if cbga.result() != DetectionStatus::NotDetected {
                assert!(CBGA_CLAMP.contains(cbga.percent_weight()));
            }
            let cbg = p.analyte(Analyte::Cbg).unwrap();
            if cbg.result() != DetectionStatus::NotDetected {
                assert!(CBG_CLAMP.contains(cbg.percent_weight()));
            }
        }
    }

    #[test]
    fn hemp_cbd_can_be_detected() {
        let seen = (0..200).any(|hint| {
            generate_seeded(ProfileType::Hemp, ProductClass::Flower, None, Some(hint))
                .analyte(Analyte::Cbd)
                .map(|a| a.is_detected())
                .unwrap_or(false)
        });
        assert!(seen);
        let p = generate_seeded(ProfileType::Hemp, ProductClass::Flower, None, Some(7));
        assert!(p.analyte(Analyte::Cbda).unwrap().percent_weight() >= 8.0);
    }

    #[test]
    fn gummy_has_no_thca() {
        let p = generate_seeded(ProfileType::Gummy, ProductClass::Edible, None, Some(5));
        assert_eq!(p.analyte(Analyte::Thca).unwrap().result(), DetectionStatus::NotDetected);
        assert!(p.analyte(Analyte::D9Thc).unwrap().is_detected());
    }

    #[test]
    fn request_with_dose_uses_converter() {
        let mut req = GenerationRequest::for_product(coa_core::ProductType::Edible);
        req.edible_dosage = Some(35.0);
        let p = generate_for_request(&req, &mut SampleRng::from_seed_u64(0));
        assert_eq!(p.total_thc(), 1.0);
        assert_eq!(p.sample_size(), Some(DEFAULT_SAMPLE_SIZE));
    }

    #[test]
    fn request_without_dose_samples_default_profile() {
        let req = GenerationRequest::for_product(coa_core::ProductType::PreRoll);
        let p = generate_for_request(&req, &mut SampleRng::from_seed_u64(9));
        let thca = p.analyte(Analyte::Thca).unwrap().percent_weight();
        assert!((22.0..=30.0).contains(&thca));
        assert_eq!(p.edible_dosage(), None);
    }
}

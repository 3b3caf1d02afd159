// crates/coa_algo/src/sampler.rs
//! Analyte Sampler: one concentration draw with detection-status semantics.
//!
//! Order of decisions for `sample`:
//! 1. Non-edible path: analytes in `FORCED_NOT_DETECTED` (Δ8-THC, CBD, CBDV, CBN,
//!    CBL, CBC, THCV) are always `ND`, whatever the probability.
//! 2. Bernoulli trial against `detection_probability`; a miss is `ND`.
//! 3. Uniform draw in `[min, max]`, rounded (2 decimals; 3 for edible Δ9-THC).
//! 4. Classification of the *rounded* value: `< LOD` → `ND` (value 0),
//!    `[LOD, LOQ)` → `< LOQ` (value kept), `>= LOQ` → `detected`.
//!
//! `draw` skips step 1; the generator uses it only for the hemp CBD special case.

use coa_core::rounding::{round_to, EDIBLE_D9_DECIMALS, FLOWER_DECIMALS};
use coa_core::{
    Analyte, AnalyteResult, ConcentrationRange, DetectionLimits, DetectionStatus, PotencyRng,
    ProductClass,
};

use crate::ranges::limits_for;

/// Sampler output: the (rounded) value and its status. `ND` always carries `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub status: DetectionStatus,
}

impl Sample {
    pub const NOT_DETECTED: Sample = Sample { value: 0.0, status: DetectionStatus::NotDetected };

    /// Classify an already-rounded value.
    pub fn classify(value: f64, limits: DetectionLimits) -> Sample {
        match limits.classify(value) {
            DetectionStatus::NotDetected => Sample::NOT_DETECTED,
            status => Sample { value, status },
        }
    }

    pub fn into_result(self, analyte: Analyte, limits: DetectionLimits) -> AnalyteResult {
        AnalyteResult::new(analyte, self.value, limits, self.status)
    }
}

/// Reported decimal places for an analyte under a product class.
pub fn decimals_for(analyte: Analyte, class: ProductClass) -> u32 {
    match (analyte, class) {
        (Analyte::D9Thc, ProductClass::Edible) => EDIBLE_D9_DECIMALS,
        _ => FLOWER_DECIMALS,
    }
}

/// Draw one analyte, honouring the forced-`ND` rule of the non-edible path.
pub fn sample<R: PotencyRng + ?Sized>(
    rng: &mut R,
    analyte: Analyte,
    range: ConcentrationRange,
    detection_probability: f64,
    class: ProductClass,
) -> Sample {
    if class == ProductClass::Flower && analyte.is_forced_not_detected() {
        return Sample::NOT_DETECTED;
    }
    draw(rng, analyte, range, detection_probability, class)
}

/// Draw one analyte without the forced-`ND` rule.
pub fn draw<R: PotencyRng + ?Sized>(
    rng: &mut R,
    analyte: Analyte,
    range: ConcentrationRange,
    detection_probability: f64,
    class: ProductClass,
) -> Sample {
    if !rng.chance(detection_probability) {
        return Sample::NOT_DETECTED;
    }
    let value = round_to(rng.uniform(range.min, range.max), decimals_for(analyte, class));
    Sample::classify(value, limits_for(analyte, class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coa_core::SampleRng;

    /// Replays a fixed sequence of floats.
    struct Script(Vec<f64>, usize);

    impl PotencyRng for Script {
        fn next_f64(&mut self) -> f64 {
            let v = self.0[self.1 % self.0.len()];
            self.1 += 1;
            v
        }
    }

    #[test]
    fn forced_analytes_never_detected_on_flower() {
        let mut rng = SampleRng::from_seed_u64(3);
        for a in coa_core::analytes::FORCED_NOT_DETECTED {
            for _ in 0..50 {
                let s = sample(&mut rng, a, ConcentrationRange::new(1.0, 2.0), 1.0, ProductClass::Flower);
                assert_eq!(s, Sample::NOT_DETECTED);
            }
        }
    }

    #[test]
    fn forced_rule_does_not_apply_to_edibles() {
        let mut rng = Script(vec![0.0, 0.5], 0);
        let s = sample(&mut rng, Analyte::Cbn, ConcentrationRange::new(1.0, 2.0), 1.0, ProductClass::Edible);
        assert_eq!(s.status, DetectionStatus::Detected);
        assert_eq!(s.value, 1.5);
    }

    #[test]
    fn bernoulli_miss_is_not_detected() {
        // chance(0.5) sees 0.9 → miss
        let mut rng = Script(vec![0.9, 0.5], 0);
        let s = draw(&mut rng, Analyte::Thca, ConcentrationRange::new(20.0, 30.0), 0.5, ProductClass::Flower);
        assert_eq!(s, Sample::NOT_DETECTED);
    }

    #[test]
    fn classification_bands_on_rounded_value() {
        // flower Δ9-THC limits: LOD 0.05, LOQ 0.10
        let range = ConcentrationRange::new(0.0, 0.2);
        let below = draw(&mut Script(vec![0.0, 0.2], 0), Analyte::D9Thc, range, 1.0, ProductClass::Flower);
        assert_eq!(below, Sample::NOT_DETECTED); // 0.04
        let band = draw(&mut Script(vec![0.0, 0.35], 0), Analyte::D9Thc, range, 1.0, ProductClass::Flower);
        assert_eq!(band, Sample { value: 0.07, status: DetectionStatus::BelowQuantificationLimit });
        let hit = draw(&mut Script(vec![0.0, 0.75], 0), Analyte::D9Thc, range, 1.0, ProductClass::Flower);
        assert_eq!(hit, Sample { value: 0.15, status: DetectionStatus::Detected });
    }

    #[test]
    fn edible_d9_uses_three_decimals() {
        assert_eq!(decimals_for(Analyte::D9Thc, ProductClass::Edible), 3);
        assert_eq!(decimals_for(Analyte::D9Thc, ProductClass::Flower), 2);
        assert_eq!(decimals_for(Analyte::Cbn, ProductClass::Edible), 2);
        let s = draw(
            &mut Script(vec![0.0, 0.123_45], 0),
            Analyte::D9Thc,
            ConcentrationRange::new(0.0, 1.0),
            1.0,
            ProductClass::Edible,
        );
        assert_eq!(s.value, 0.123);
    }

    #[test]
    fn seeded_samples_are_reproducible() {
        let range = ConcentrationRange::new(22.0, 30.0);
        let a = sample(&mut SampleRng::from_seed_hint(11), Analyte::Thca, range, 1.0, ProductClass::Flower);
        let b = sample(&mut SampleRng::from_seed_hint(11), Analyte::Thca, range, 1.0, ProductClass::Flower);
        assert_eq!(a, b);
        assert!(range.contains(a.value));
    }
}

//! Property tests for generated profiles: totals identities, threshold
//! consistency, forced non-detection, and the high-THC range scenario.

use coa_algo::{compute_totals, convert_dosage, generate_profile, limits_for};
use coa_core::analytes::FORCED_NOT_DETECTED;
use coa_core::{Analyte, DetectionStatus, ProductClass, ProfileType, SampleRng, DECARB_FACTOR};
use proptest::prelude::*;

fn any_profile_type() -> impl Strategy<Value = ProfileType> {
    prop::sample::select(ProfileType::ALL.to_vec())
}

fn class_for(p: ProfileType) -> ProductClass {
    match p {
        ProfileType::Gummy => ProductClass::Edible,
        _ => ProductClass::Flower,
    }
}

proptest! {
    #[test]
    fn decarboxylation_identity(seed in any::<u64>(), p in any_profile_type()) {
        let profile = generate_profile(&mut SampleRng::from_seed_u64(seed), p, class_for(p), None);
        let pct = |a: Analyte| profile.analyte(a).map(|x| x.percent_weight()).unwrap_or(0.0);
        let thc = pct(Analyte::D9Thc) + DECARB_FACTOR * pct(Analyte::Thca);
        let cbd = pct(Analyte::Cbd) + DECARB_FACTOR * pct(Analyte::Cbda);
        prop_assert!((profile.total_thc() - thc).abs() < 1e-6);
        prop_assert!((profile.total_cbd() - cbd).abs() < 1e-6);
    }

    #[test]
    fn detected_sum_identity(seed in any::<u64>(), p in any_profile_type()) {
        let profile = generate_profile(&mut SampleRng::from_seed_u64(seed), p, class_for(p), None);
        let sum: f64 = profile
            .cannabinoids()
            .iter()
            .filter(|a| a.result() == DetectionStatus::Detected)
            .map(|a| a.percent_weight())
            .sum();
        prop_assert!((profile.total_cannabinoids() - sum).abs() < 1e-9);
        prop_assert_eq!(profile.totals(), compute_totals(profile.cannabinoids()));
    }

    #[test]
    fn threshold_consistency(seed in any::<u64>(), p in any_profile_type()) {
        let class = class_for(p);
        let profile = generate_profile(&mut SampleRng::from_seed_u64(seed), p, class, None);
        for a in profile.cannabinoids() {
            let lim = limits_for(a.name(), class);
            prop_assert_eq!(a.limits(), lim);
            let v = a.percent_weight();
            match a.result() {
                DetectionStatus::NotDetected => prop_assert_eq!(v, 0.0),
                DetectionStatus::BelowQuantificationLimit => prop_assert!(lim.lod <= v && v < lim.loq),
                DetectionStatus::Detected => prop_assert!(v >= lim.loq),
            }
            prop_assert_eq!(a.mg_per_g(), v * 10.0);
        }
    }

    #[test]
    fn forced_not_detected_on_flower(seed in any::<u64>(), p in any_profile_type()) {
        prop_assume!(p != ProfileType::Hemp);
        let profile = generate_profile(&mut SampleRng::from_seed_u64(seed), p, ProductClass::Flower, None);
        for name in FORCED_NOT_DETECTED {
            prop_assert_eq!(profile.analyte(name).map(|a| a.result()), Some(DetectionStatus::NotDetected));
        }
    }

    #[test]
    // doses at or above the edible Δ9-THC LOD, `< LOQ` included
    fn dosage_percent_matches_dose(dose in 2.0f64..500.0, grams in 1u32..20) {
        let mass = format!("{grams}g");
        let profile = convert_dosage(dose, &mass);
        let d9 = profile.analyte(Analyte::D9Thc).map(|a| a.percent_weight()).unwrap_or(0.0);
        let expected = dose / (grams as f64 * 1000.0) * 100.0;
        prop_assert!((d9 - expected).abs() <= 0.0005 + 1e-12);
        prop_assert_eq!(profile.total_thc(), d9);
        prop_assert_eq!(profile.total_cannabinoids(), d9);
        prop_assert_eq!(profile.total_cbd(), 0.0);
    }
}

#[test]
fn hemp_cbd_is_the_only_forced_exception() {
    let mut rng = SampleRng::from_seed_u64(77);
    for _ in 0..200 {
        let profile = generate_profile(&mut rng, ProfileType::Hemp, ProductClass::Flower, None);
        for name in FORCED_NOT_DETECTED.iter().filter(|a| **a != Analyte::Cbd) {
            assert_eq!(profile.analyte(*name).unwrap().result(), DetectionStatus::NotDetected);
        }
    }
}

#[test]
fn high_thc_thousand_runs_stay_in_range() {
    for hint in 0..1000u64 {
        let profile = generate_profile(
            &mut SampleRng::from_seed_hint(hint),
            ProfileType::HighThc,
            ProductClass::Flower,
            None,
        );
        let thca = profile.analyte(Analyte::Thca).unwrap();
        let d9 = profile.analyte(Analyte::D9Thc).unwrap();
        assert!((22.0..=30.0).contains(&thca.percent_weight()), "THCa {}", thca.percent_weight());
        assert!((0.05..=0.29).contains(&d9.percent_weight()), "Δ9-THC {}", d9.percent_weight());
        assert_ne!(d9.result(), DetectionStatus::NotDetected);
    }
}

#[test]
fn edible_round_trip_scenario() {
    let profile = convert_dosage(50.0, "5g");
    assert_eq!(profile.analyte(Analyte::D9Thc).unwrap().percent_weight(), 1.000);
    assert_eq!(profile.total_thc(), 1.000);
    assert_eq!(profile.total_cbd(), 0.0);
}

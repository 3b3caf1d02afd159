// crates/coa_algo/src/ranges.rs
//! Range Table: read-only reference data.
//!
//! - `RANGE_TABLE`: one row per `ProfileType` (declaration order) with the
//!   concentration ranges of the primary analytes. Every row pins THCa, Δ9-THC,
//!   CBGa and CBG; hemp additionally pins CBDa and CBD.
//! - `FLOWER_LIMITS` / `EDIBLE_LIMITS`: LOD/LOQ per analyte for each product
//!   class. Edible limits are stricter (finer resolution on sub-percent values).
//!
//! All values are % w/w. Lookups are total over the enums; a name that is not in
//! the vocabulary falls back to `DEFAULT_LIMITS`.

use coa_core::{Analyte, ConcentrationRange, DetectionLimits, ProductClass, ProfileType};

/// Fallback LOD/LOQ for analytes outside the tables.
pub const DEFAULT_LIMITS: DetectionLimits = DetectionLimits::new(0.05, 0.15);

/// Range used for analytes a row does not pin (trace-level presence).
pub const TRACE_RANGE: ConcentrationRange = ConcentrationRange::new(0.01, 0.12);

/// Primary-analyte ranges for one profile type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRow {
    pub profile_type: ProfileType,
    pub thca: ConcentrationRange,
    pub d9thc: ConcentrationRange,
    pub cbga: ConcentrationRange,
    pub cbg: ConcentrationRange,
    /// Additional pinned analytes (hemp: CBDa, CBD).
    pub extra: &'static [(Analyte, ConcentrationRange)],
}

impl RangeRow {
    /// Range pinned by this row for `analyte`, if any.
    pub fn range(&self, analyte: Analyte) -> Option<ConcentrationRange> {
        match analyte {
            Analyte::Thca => Some(self.thca),
            Analyte::D9Thc => Some(self.d9thc),
            Analyte::Cbga => Some(self.cbga),
            Analyte::Cbg => Some(self.cbg),
            other => self.extra.iter().find(|(a, _)| *a == other).map(|(_, r)| *r),
        }
    }
}

const fn r(min: f64, max: f64) -> ConcentrationRange {
    ConcentrationRange::new(min, max)
}

const fn l(lod: f64, loq: f64) -> DetectionLimits {
    DetectionLimits::new(lod, loq)
}

/// Indexed by `ProfileType` discriminant.
pub static RANGE_TABLE: [RangeRow; 8] = [
    RangeRow {
        profile_type: ProfileType::HighThc,
        thca: r(22.0, 30.0),
        d9thc: r(0.05, 0.29),
        cbga: r(0.3, 1.2),
        cbg: r(0.05, 0.35),
        extra: &[],
    },
    RangeRow {
        profile_type: ProfileType::MediumThc,
        thca: r(15.0, 22.0),
        d9thc: r(0.05, 0.25),
        cbga: r(0.2, 1.0),
        cbg: r(0.04, 0.30),
        extra: &[],
    },
    RangeRow {
        profile_type: ProfileType::LowThc,
        thca: r(8.0, 15.0),
        d9thc: r(0.05, 0.20),
        cbga: r(0.1, 0.8),
        cbg: r(0.02, 0.20),
        extra: &[],
    },
    RangeRow {
        profile_type: ProfileType::Hemp,
        thca: r(0.10, 0.30),
        d9thc: r(0.02, 0.08),
        cbga: r(0.1, 0.5),
        cbg: r(0.02, 0.15),
        extra: &[(Analyte::Cbda, r(8.0, 16.0)), (Analyte::Cbd, r(0.2, 0.9))],
    },
    RangeRow {
        profile_type: ProfileType::Decarbed,
        thca: r(0.3, 1.5),
        d9thc: r(14.0, 22.0),
        cbga: r(0.1, 0.4),
        cbg: r(0.20, 0.45),
        extra: &[],
    },
    RangeRow {
        profile_type: ProfileType::DisposableVape,
        // floor at the flower THCa LOQ so THCa always counts toward totalCannabinoids
        thca: r(0.15, 0.8),
        d9thc: r(78.0, 92.0),
        cbga: r(0.1, 0.3),
        cbg: r(0.20, 0.45),
        extra: &[],
    },
    RangeRow {
        profile_type: ProfileType::Concentrate,
        thca: r(60.0, 82.0),
        d9thc: r(1.5, 5.0),
        cbga: r(0.8, 1.5),
        cbg: r(0.10, 0.45),
        extra: &[],
    },
    RangeRow {
        profile_type: ProfileType::Gummy,
        thca: r(0.0, 0.0),
        d9thc: r(0.10, 0.60),
        cbga: r(0.1, 0.2),
        cbg: r(0.02, 0.10),
        extra: &[],
    },
];

pub static FLOWER_LIMITS: [(Analyte, DetectionLimits); 12] = [
    (Analyte::Thca, l(0.05, 0.15)),
    // LOD 0.05 so the high-THC Δ9-THC floor (0.05) reports as `< LOQ`, not `ND`
    (Analyte::D9Thc, l(0.05, 0.10)),
    (Analyte::D8Thc, l(0.05, 0.15)),
    (Analyte::Thcv, l(0.03, 0.10)),
    (Analyte::Cbda, l(0.03, 0.10)),
    (Analyte::Cbd, l(0.03, 0.10)),
    (Analyte::Cbdv, l(0.03, 0.10)),
    (Analyte::Cbn, l(0.03, 0.10)),
    (Analyte::Cbga, l(0.05, 0.15)),
    (Analyte::Cbg, l(0.02, 0.06)),
    (Analyte::Cbc, l(0.03, 0.10)),
    (Analyte::Cbl, l(0.05, 0.15)),
];

pub static EDIBLE_LIMITS: [(Analyte, DetectionLimits); 12] = [
    (Analyte::Thca, l(0.005, 0.015)),
    (Analyte::D9Thc, l(0.01, 0.03)),
    (Analyte::D8Thc, l(0.01, 0.03)),
    (Analyte::Thcv, l(0.005, 0.015)),
    (Analyte::Cbda, l(0.005, 0.015)),
    (Analyte::Cbd, l(0.01, 0.03)),
    (Analyte::Cbdv, l(0.005, 0.015)),
    (Analyte::Cbn, l(0.005, 0.015)),
    (Analyte::Cbga, l(0.005, 0.015)),
    (Analyte::Cbg, l(0.005, 0.015)),
    (Analyte::Cbc, l(0.005, 0.015)),
    (Analyte::Cbl, l(0.005, 0.015)),
];

/// Range Table row for a profile type.
pub fn range_row(profile_type: ProfileType) -> &'static RangeRow {
    &RANGE_TABLE[profile_type as usize]
}

/// LOD/LOQ for an analyte under a product class.
pub fn limits_for(analyte: Analyte, class: ProductClass) -> DetectionLimits {
    let table: &[(Analyte, DetectionLimits)] = match class {
        ProductClass::Flower => &FLOWER_LIMITS,
        ProductClass::Edible => &EDIBLE_LIMITS,
    };
    table
        .iter()
        .find(|(a, _)| *a == analyte)
        .map(|(_, lim)| *lim)
        .unwrap_or(DEFAULT_LIMITS)
}

/// LOD/LOQ by analyte name; unknown names get `DEFAULT_LIMITS`.
pub fn limits_for_name(name: &str, class: ProductClass) -> DetectionLimits {
    match name.parse::<Analyte>() {
        Ok(a) => limits_for(a, class),
        Err(_) => {
            tracing::warn!("unknown analyte '{}', using default LOD/LOQ", name);
            DEFAULT_LIMITS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_follow_profile_declaration_order() {
        for (i, p) in ProfileType::ALL.iter().enumerate() {
            assert_eq!(RANGE_TABLE[i].profile_type, *p);
            assert_eq!(range_row(*p).profile_type, *p);
        }
    }

    #[test]
    fn ranges_are_well_formed() {
        for row in RANGE_TABLE.iter() {
            for a in Analyte::ALL {
                if let Some(rg) = row.range(*a) {
                    assert!(rg.min <= rg.max, "{:?} {:?}", row.profile_type, a);
                    assert!(rg.min >= 0.0);
                }
            }
        }
    }

    #[test]
    fn only_hemp_pins_cbd() {
        for row in RANGE_TABLE.iter() {
            let pinned = row.range(Analyte::Cbd).is_some();
            assert_eq!(pinned, row.profile_type == ProfileType::Hemp);
        }
        assert_eq!(range_row(ProfileType::Hemp).range(Analyte::Cbda), Some(r(8.0, 16.0)));
    }

    #[test]
    fn high_thc_row_matches_reference_ranges() {
        let row = range_row(ProfileType::HighThc);
        assert_eq!(row.thca, r(22.0, 30.0));
        assert_eq!(row.d9thc, r(0.05, 0.29));
    }

    #[test]
    fn primary_thca_floors_reach_flower_loq() {
        let loq = limits_for(Analyte::Thca, ProductClass::Flower).loq;
        for p in [ProfileType::Decarbed, ProfileType::DisposableVape, ProfileType::Concentrate] {
            assert!(range_row(p).thca.min >= loq, "{p}");
        }
    }

    #[test]
    fn edible_limits_are_stricter() {
        for a in Analyte::ALL {
            let f = limits_for(*a, ProductClass::Flower);
            let e = limits_for(*a, ProductClass::Edible);
            assert!(e.lod < f.lod, "{a}");
            assert!(e.loq < f.loq, "{a}");
            assert!(f.lod < f.loq && e.lod < e.loq);
        }
        assert_eq!(limits_for(Analyte::D9Thc, ProductClass::Edible).lod, 0.01);
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        assert_eq!(limits_for_name("CBT", ProductClass::Flower), DEFAULT_LIMITS);
        assert_eq!(limits_for_name("THCa", ProductClass::Flower), l(0.05, 0.15));
    }
}

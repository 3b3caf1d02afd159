//! analytes.rs — Analyte vocabulary, detection status, limits and ranges.

/// Analytes that the non-edible generation path always reports as not detected.
pub const FORCED_NOT_DETECTED: [Analyte; 7] = [
    Analyte::D8Thc,
    Analyte::Cbd,
    Analyte::Cbdv,
    Analyte::Cbn,
    Analyte::Cbl,
    Analyte::Cbc,
    Analyte::Thcv,
];

wire_enum!(
    /// Fixed analyte vocabulary. Declaration order is report order.
    Analyte => {
        Thca  = "THCa",
        D9Thc = "Δ9-THC",
        D8Thc = "Δ8-THC",
        Thcv  = "THCV",
        Cbda  = "CBDa",
        Cbd   = "CBD",
        Cbdv  = "CBDV",
        Cbn   = "CBN",
        Cbga  = "CBGa",
        Cbg   = "CBG",
        Cbc   = "CBC",
        Cbl   = "CBL",
    }
);

wire_enum!(
    /// Detection outcome of one analyte. Wire tokens are fixed: `detected`, `< LOQ`, `ND`.
    DetectionStatus => {
        Detected                 = "detected",
        BelowQuantificationLimit = "< LOQ",
        NotDetected              = "ND",
    }
);

impl Analyte {
    /// True for the analytes the non-edible path forces to `ND`.
    pub fn is_forced_not_detected(self) -> bool {
        FORCED_NOT_DETECTED.contains(&self)
    }

    /// Acidic precursor that decarboxylates into another reported analyte.
    pub fn is_acid_form(self) -> bool {
        matches!(self, Analyte::Thca | Analyte::Cbda | Analyte::Cbga)
    }
}

/// Limit of detection / limit of quantification, both in % w/w.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionLimits {
    pub lod: f64,
    pub loq: f64,
}

impl DetectionLimits {
    pub const fn new(lod: f64, loq: f64) -> Self {
        Self { lod, loq }
    }

    /// Classify an already-rounded value against these limits.
    ///
    /// `value < lod` → `ND`; `lod <= value < loq` → `< LOQ`; otherwise `detected`.
    pub fn classify(&self, value: f64) -> DetectionStatus {
        if value.is_nan() || value < self.lod {
            DetectionStatus::NotDetected
        } else if value < self.loq {
            DetectionStatus::BelowQuantificationLimit
        } else {
            DetectionStatus::Detected
        }
    }
}

/// Closed concentration interval `[min, max]` in % w/w.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcentrationRange {
    pub min: f64,
    pub max: f64,
}

impl ConcentrationRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_respects_half_open_band() {
        let l = DetectionLimits::new(0.05, 0.15);
        assert_eq!(l.classify(0.0), DetectionStatus::NotDetected);
        assert_eq!(l.classify(0.049), DetectionStatus::NotDetected);
        assert_eq!(l.classify(0.05), DetectionStatus::BelowQuantificationLimit);
        assert_eq!(l.classify(0.149), DetectionStatus::BelowQuantificationLimit);
        assert_eq!(l.classify(0.15), DetectionStatus::Detected);
        assert_eq!(l.classify(f64::NAN), DetectionStatus::NotDetected);
    }

    #[test]
    fn wire_tokens_round_trip_through_from_str() {
        for a in Analyte::ALL {
            assert_eq!(a.as_str().parse::<Analyte>().unwrap(), *a);
        }
        assert_eq!("< LOQ".parse::<DetectionStatus>().unwrap(), DetectionStatus::BelowQuantificationLimit);
        assert_eq!("ND".parse::<DetectionStatus>().unwrap(), DetectionStatus::NotDetected);
        assert!("nd".parse::<DetectionStatus>().is_err());
    }

    #[test]
    fn forced_list_matches_vocabulary() {
        let forced: Vec<_> = Analyte::ALL.iter().filter(|a| a.is_forced_not_detected()).collect();
        assert_eq!(forced.len(), 7);
        assert!(!Analyte::Thca.is_forced_not_detected());
        assert!(!Analyte::Cbda.is_forced_not_detected());
    }
}

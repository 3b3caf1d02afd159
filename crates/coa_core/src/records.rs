//! records.rs — Immutable analyte / profile / COA records.
//!
//! Wire shape (downstream renderers key off these exact names):
//! - analyte: `name, percentWeight, mgPerG, loq, lod, result`
//! - profile: `cannabinoids[], totalTHC, totalCBD, totalCannabinoids,
//!   edibleDosage?, sampleSize?`
//!
//! Records are value objects: any edit returns a new record. `AnalyteResult::new`
//! keeps `mgPerG == percentWeight × 10` and `ND ⇒ 0`; `from_parts` accepts
//! arbitrary (possibly inconsistent) values for externally supplied data, which
//! is what the validator exists to catch.

use crate::analytes::{Analyte, DetectionLimits, DetectionStatus};
use crate::rounding::percent_to_mg_per_g;
use crate::variables::{ProductType, ProfileType};

// ------------------------------------------------------------------------------------------------
// Analyte
// ------------------------------------------------------------------------------------------------

/// One measured compound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AnalyteResult {
    name: Analyte,
    percent_weight: f64,
    mg_per_g: f64,
    loq: f64,
    lod: f64,
    result: DetectionStatus,
}

impl AnalyteResult {
    /// Build a consistent record; `ND` zeroes the value.
    pub fn new(name: Analyte, percent_weight: f64, limits: DetectionLimits, result: DetectionStatus) -> Self {
        let percent_weight = match result {
            DetectionStatus::NotDetected => 0.0,
            _ => percent_weight,
        };
        Self {
            name,
            percent_weight,
            mg_per_g: percent_to_mg_per_g(percent_weight),
            loq: limits.loq,
            lod: limits.lod,
            result,
        }
    }

    pub fn not_detected(name: Analyte, limits: DetectionLimits) -> Self {
        Self::new(name, 0.0, limits, DetectionStatus::NotDetected)
    }

    /// Raw constructor without invariant enforcement (imported or hand-edited data).
    pub fn from_parts(
        name: Analyte,
        percent_weight: f64,
        mg_per_g: f64,
        limits: DetectionLimits,
        result: DetectionStatus,
    ) -> Self {
        Self { name, percent_weight, mg_per_g, loq: limits.loq, lod: limits.lod, result }
    }

    pub fn name(&self) -> Analyte {
        self.name
    }

    pub fn percent_weight(&self) -> f64 {
        self.percent_weight
    }

    pub fn mg_per_g(&self) -> f64 {
        self.mg_per_g
    }

    pub fn limits(&self) -> DetectionLimits {
        DetectionLimits::new(self.lod, self.loq)
    }

    pub fn result(&self) -> DetectionStatus {
        self.result
    }

    pub fn is_detected(&self) -> bool {
        self.result == DetectionStatus::Detected
    }
}

// ------------------------------------------------------------------------------------------------
// Profile
// ------------------------------------------------------------------------------------------------

/// Derived totals, all in % w/w.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PotencyTotals {
    pub total_thc: f64,
    pub total_cbd: f64,
    pub total_cannabinoids: f64,
}

/// Full report body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PotencyProfile {
    cannabinoids: Vec<AnalyteResult>,
    #[cfg_attr(feature = "serde", serde(rename = "totalTHC"))]
    total_thc: f64,
    #[cfg_attr(feature = "serde", serde(rename = "totalCBD"))]
    total_cbd: f64,
    total_cannabinoids: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    edible_dosage: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    sample_size: Option<String>,
}

impl PotencyProfile {
    /// Totals are taken as given; the aggregator in `coa_algo` is what computes them.
    pub fn new(cannabinoids: Vec<AnalyteResult>, totals: PotencyTotals) -> Self {
        Self {
            cannabinoids,
            total_thc: totals.total_thc,
            total_cbd: totals.total_cbd,
            total_cannabinoids: totals.total_cannabinoids,
            edible_dosage: None,
            sample_size: None,
        }
    }

    /// Attach edible context (dose in mg and the sample mass as entered).
    pub fn with_edible_context(mut self, dose_mg: f64, sample_size: impl Into<String>) -> Self {
        self.edible_dosage = Some(dose_mg);
        self.sample_size = Some(sample_size.into());
        self
    }

    /// Copy with replaced totals (manual edits downstream).
    pub fn with_totals(mut self, totals: PotencyTotals) -> Self {
        self.total_thc = totals.total_thc;
        self.total_cbd = totals.total_cbd;
        self.total_cannabinoids = totals.total_cannabinoids;
        self
    }

    pub fn with_total_thc(mut self, value: f64) -> Self {
        self.total_thc = value;
        self
    }

    pub fn with_total_cannabinoids(mut self, value: f64) -> Self {
        self.total_cannabinoids = value;
        self
    }

    /// Copy with the analyte of the same name replaced (appended if absent).
    pub fn with_analyte(mut self, analyte: AnalyteResult) -> Self {
        match self.cannabinoids.iter_mut().find(|a| a.name == analyte.name) {
            Some(slot) => *slot = analyte,
            None => self.cannabinoids.push(analyte),
        }
        self
    }

    pub fn cannabinoids(&self) -> &[AnalyteResult] {
        &self.cannabinoids
    }

    pub fn analyte(&self, name: Analyte) -> Option<&AnalyteResult> {
        self.cannabinoids.iter().find(|a| a.name == name)
    }

    pub fn totals(&self) -> PotencyTotals {
        PotencyTotals {
            total_thc: self.total_thc,
            total_cbd: self.total_cbd,
            total_cannabinoids: self.total_cannabinoids,
        }
    }

    pub fn total_thc(&self) -> f64 {
        self.total_thc
    }

    pub fn total_cbd(&self) -> f64 {
        self.total_cbd
    }

    pub fn total_cannabinoids(&self) -> f64 {
        self.total_cannabinoids
    }

    pub fn edible_dosage(&self) -> Option<f64> {
        self.edible_dosage
    }

    pub fn sample_size(&self) -> Option<&str> {
        self.sample_size.as_deref()
    }
}

// ------------------------------------------------------------------------------------------------
// COA document record
// ------------------------------------------------------------------------------------------------

/// Document-level record: identity, product context, moisture, and the profile.
/// The profile fields are flattened so downstream readers see `cannabinoids`
/// and the totals at the top level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoaRecord {
    pub batch_id: String,
    pub sample_id: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub strain_name: Option<String>,
    pub product_type: ProductType,
    pub profile_type: ProfileType,
    /// Moisture content in %; absent for edibles.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub moisture: Option<f64>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub profile: PotencyProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> DetectionLimits {
        DetectionLimits::new(0.05, 0.15)
    }

    #[test]
    fn new_keeps_mg_per_g_consistent() {
        let a = AnalyteResult::new(Analyte::Thca, 24.37, limits(), DetectionStatus::Detected);
        assert_eq!(a.mg_per_g(), 24.37 * 10.0);
        assert_eq!(a.limits(), limits());
        assert!(a.is_detected());
    }

    #[test]
    fn not_detected_zeroes_value() {
        let a = AnalyteResult::new(Analyte::Cbn, 0.4, limits(), DetectionStatus::NotDetected);
        assert_eq!(a.percent_weight(), 0.0);
        assert_eq!(a.mg_per_g(), 0.0);
    }

    #[test]
    fn edits_return_new_values() {
        let base = PotencyProfile::new(
            vec![AnalyteResult::not_detected(Analyte::Cbd, limits())],
            PotencyTotals { total_thc: 1.0, total_cbd: 0.0, total_cannabinoids: 2.0 },
        );
        let edited = base.clone().with_total_thc(3.0);
        assert_eq!(base.total_thc(), 1.0);
        assert_eq!(edited.total_thc(), 3.0);

        let replaced = base
            .clone()
            .with_analyte(AnalyteResult::new(Analyte::Cbd, 0.3, limits(), DetectionStatus::Detected));
        assert_eq!(replaced.cannabinoids().len(), 1);
        assert_eq!(replaced.analyte(Analyte::Cbd).map(|a| a.percent_weight()), Some(0.3));

        let appended = base.with_analyte(AnalyteResult::not_detected(Analyte::Cbn, limits()));
        assert_eq!(appended.cannabinoids().len(), 2);
    }
}

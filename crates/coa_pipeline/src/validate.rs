//! crates/coa_pipeline/src/validate.rs
//! Validation Engine: three independent sub-checks merged into one report.
//!
//! - Formula: re-derive `totalTHC`, `totalCBD`, `totalCannabinoids` through the
//!   same aggregator the generator uses; `|diff| > 0.1` is an error. Every
//!   analyte's `mgPerG` must equal `percentWeight × 10` within 0.01.
//! - Logic: `totalCannabinoids ≥ totalTHC` (error); non-zero moisture in
//!   `[5, 20]` (warning); Δ8-THC above 2% (warning); detection status agrees
//!   with the analyte's own LOD/LOQ (error).
//! - Uniqueness: compares against prior records. `Disabled` (default) never
//!   reports a duplicate; `Enforced` flags repeated fingerprints, sample IDs,
//!   and batch IDs reused for another product type (errors) and repeated
//!   non-zero moisture (warning).
//!
//! Never fails: `is_valid = errors.is_empty()`. Issues are sorted by
//! (kind, field, message) so reports are byte-identical across runs.

use coa_algo::compute_totals;
use coa_core::rounding::{percent_to_mg_per_g, within};
use coa_core::{Analyte, AnalyteResult, CoaRecord, DetectionStatus, PotencyProfile};
use serde::{Deserialize, Serialize};

pub const TOTAL_TOLERANCE: f64 = 0.1;
pub const MG_PER_G_TOLERANCE: f64 = 0.01;
pub const MOISTURE_RANGE: (f64, f64) = (5.0, 20.0);
pub const D8_THC_WARN_PERCENT: f64 = 2.0;

// ------------------------------------------------------------------------------------------------
// Report model
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    #[serde(rename = "formula")]
    Formula,
    #[serde(rename = "logic-consistency")]
    LogicConsistency,
    #[serde(rename = "uniqueness")]
    Uniqueness,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<f64>,
}

impl ValidationIssue {
    fn new(kind: IssueKind, severity: Severity, field: impl Into<String>, message: String) -> Self {
        Self {
            kind,
            severity,
            message,
            field: Some(field.into()),
            expected_value: None,
            actual_value: None,
        }
    }

    fn values(mut self, expected: Option<f64>, actual: Option<f64>) -> Self {
        self.expected_value = expected;
        self.actual_value = actual;
        self
    }
}

/// Formula sub-check diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaCheck {
    #[serde(rename = "expectedTotalTHC")]
    pub expected_total_thc: f64,
    #[serde(rename = "expectedTotalCBD")]
    pub expected_total_cbd: f64,
    pub expected_total_cannabinoids: f64,
    #[serde(rename = "totalTHCMatches")]
    pub total_thc_matches: bool,
    #[serde(rename = "totalCBDMatches")]
    pub total_cbd_matches: bool,
    pub total_cannabinoids_matches: bool,
    pub mg_per_g_consistent: bool,
}

/// Logic-consistency sub-check diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicCheck {
    pub cannabinoids_cover_thc: bool,
    /// `None` when no (non-zero) moisture was reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_in_range: Option<bool>,
    #[serde(rename = "d8THCPlausible")]
    pub d8_thc_plausible: bool,
    pub thresholds_consistent: bool,
}

/// Whether duplicate detection runs at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessPolicy {
    #[default]
    Disabled,
    Enforced,
}

/// Uniqueness sub-check diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessCheck {
    pub policy: UniquenessPolicy,
    pub duplicate_cannabinoids: bool,
    pub duplicate_moisture: bool,
    pub duplicate_batch_id: bool,
    pub duplicate_sample_id: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    pub uniqueness: UniquenessPolicy,
}

/// Report: valid = no errors; warnings never affect validity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub formula_check: FormulaCheck,
    pub logic_check: LogicCheck,
    pub uniqueness_check: UniquenessCheck,
}

impl ValidationReport {
    /// Errors then warnings.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn count(&self, kind: IssueKind, severity: Severity) -> usize {
        self.issues()
            .filter(|i| i.kind == kind && i.severity == severity)
            .count()
    }
}

// ------------------------------------------------------------------------------------------------
// Entry points
// ------------------------------------------------------------------------------------------------

/// Validate one COA record against the records that came before it.
pub fn validate(record: &CoaRecord, history: &[CoaRecord], options: &ValidationOptions) -> ValidationReport {
    let mut issues = Vec::new();
    let formula_check = check_formula(&record.profile, &mut issues);
    let logic_check = check_logic(&record.profile, record.moisture, &mut issues);
    let uniqueness_check = check_uniqueness(record, history, options.uniqueness, &mut issues);
    assemble(issues, formula_check, logic_check, uniqueness_check)
}

/// Validate a bare profile (no moisture, no identity, no history).
pub fn validate_profile(profile: &PotencyProfile) -> ValidationReport {
    let mut issues = Vec::new();
    let formula_check = check_formula(profile, &mut issues);
    let logic_check = check_logic(profile, None, &mut issues);
    assemble(issues, formula_check, logic_check, UniquenessCheck::default())
}

fn assemble(
    mut issues: Vec<ValidationIssue>,
    formula_check: FormulaCheck,
    logic_check: LogicCheck,
    uniqueness_check: UniquenessCheck,
) -> ValidationReport {
    sort_issues_stably(&mut issues);
    let (errors, warnings): (Vec<_>, Vec<_>) = issues
        .into_iter()
        .partition(|i| i.severity == Severity::Error);
    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        formula_check,
        logic_check,
        uniqueness_check,
    }
}

/// (kind, field, message); `sort_by` is stable so equal keys keep insertion order.
fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.field.cmp(&b.field))
            .then_with(|| a.message.cmp(&b.message))
    });
}

fn analyte_field(a: &AnalyteResult, leaf: &str) -> String {
    format!("cannabinoids[{}].{}", a.name(), leaf)
}

// ------------------------------------------------------------------------------------------------
// Formula
// ------------------------------------------------------------------------------------------------

fn check_formula(profile: &PotencyProfile, issues: &mut Vec<ValidationIssue>) -> FormulaCheck {
    let expected = compute_totals(profile.cannabinoids());
    let actual = profile.totals();

    let mut total = |field: &str, expected: f64, actual: f64| -> bool {
        let ok = within(actual, expected, TOTAL_TOLERANCE);
        if !ok {
            issues.push(
                ValidationIssue::new(
                    IssueKind::Formula,
                    Severity::Error,
                    field,
                    format!("{field} is {actual} but the formula gives {expected}"),
                )
                .values(Some(expected), Some(actual)),
            );
        }
        ok
    };
    let total_thc_matches = total("totalTHC", expected.total_thc, actual.total_thc);
    let total_cbd_matches = total("totalCBD", expected.total_cbd, actual.total_cbd);
    let total_cannabinoids_matches = total(
        "totalCannabinoids",
        expected.total_cannabinoids,
        actual.total_cannabinoids,
    );

    let mut mg_per_g_consistent = true;
    for a in profile.cannabinoids() {
        let want = percent_to_mg_per_g(a.percent_weight());
        if !within(a.mg_per_g(), want, MG_PER_G_TOLERANCE) {
            mg_per_g_consistent = false;
            issues.push(
                ValidationIssue::new(
                    IssueKind::Formula,
                    Severity::Error,
                    analyte_field(a, "mgPerG"),
                    format!("{} mg/g is {} but {}% implies {}", a.name(), a.mg_per_g(), a.percent_weight(), want),
                )
                .values(Some(want), Some(a.mg_per_g())),
            );
        }
    }

    FormulaCheck {
        expected_total_thc: expected.total_thc,
        expected_total_cbd: expected.total_cbd,
        expected_total_cannabinoids: expected.total_cannabinoids,
        total_thc_matches,
        total_cbd_matches,
        total_cannabinoids_matches,
        mg_per_g_consistent,
    }
}

// ------------------------------------------------------------------------------------------------
// Logic
// ------------------------------------------------------------------------------------------------

fn check_logic(
    profile: &PotencyProfile,
    moisture: Option<f64>,
    issues: &mut Vec<ValidationIssue>,
) -> LogicCheck {
    let cannabinoids_cover_thc = profile.total_cannabinoids() >= profile.total_thc();
    if !cannabinoids_cover_thc {
        issues.push(
            ValidationIssue::new(
                IssueKind::LogicConsistency,
                Severity::Error,
                "totalCannabinoids",
                format!(
                    "totalCannabinoids {} is below totalTHC {}",
                    profile.total_cannabinoids(),
                    profile.total_thc()
                ),
            )
            .values(Some(profile.total_thc()), Some(profile.total_cannabinoids())),
        );
    }

    let moisture_in_range = match moisture {
        Some(m) if m != 0.0 => {
            let (lo, hi) = MOISTURE_RANGE;
            let ok = (lo..=hi).contains(&m);
            if !ok {
                issues.push(
                    ValidationIssue::new(
                        IssueKind::LogicConsistency,
                        Severity::Warning,
                        "moisture",
                        format!("moisture {m}% is outside {lo}–{hi}%"),
                    )
                    .values(None, Some(m)),
                );
            }
            Some(ok)
        }
        _ => None,
    };

    let mut d8_thc_plausible = true;
    if let Some(d8) = profile.analyte(Analyte::D8Thc) {
        if d8.result() != DetectionStatus::NotDetected && d8.percent_weight() > D8_THC_WARN_PERCENT {
            d8_thc_plausible = false;
            issues.push(
                ValidationIssue::new(
                    IssueKind::LogicConsistency,
                    Severity::Warning,
                    analyte_field(d8, "percentWeight"),
                    format!("Δ8-THC at {}% is implausibly high", d8.percent_weight()),
                )
                .values(Some(D8_THC_WARN_PERCENT), Some(d8.percent_weight())),
            );
        }
    }

    let mut thresholds_consistent = true;
    for a in profile.cannabinoids() {
        if let Some(problem) = threshold_problem(a) {
            thresholds_consistent = false;
            issues.push(
                ValidationIssue::new(
                    IssueKind::LogicConsistency,
                    Severity::Error,
                    analyte_field(a, "result"),
                    format!("{} {}", a.name(), problem),
                )
                .values(None, Some(a.percent_weight())),
            );
        }
    }

    LogicCheck {
        cannabinoids_cover_thc,
        moisture_in_range,
        d8_thc_plausible,
        thresholds_consistent,
    }
}

fn threshold_problem(a: &AnalyteResult) -> Option<String> {
    let v = a.percent_weight();
    let lim = a.limits();
    match a.result() {
        DetectionStatus::NotDetected if v != 0.0 => Some(format!("is ND but reports {v}%")),
        DetectionStatus::Detected if v.is_nan() || v < lim.loq => {
            Some(format!("is detected at {v}%, below its LOQ {}", lim.loq))
        }
        DetectionStatus::BelowQuantificationLimit if !(lim.lod <= v && v < lim.loq) => Some(format!(
            "is < LOQ at {v}%, outside [{}, {})",
            lim.lod, lim.loq
        )),
        _ => None,
    }
}

// ------------------------------------------------------------------------------------------------
// Uniqueness
// ------------------------------------------------------------------------------------------------

fn fingerprint(record: &CoaRecord) -> Option<String> {
    match coa_io::hasher::cannabinoid_fingerprint(record.profile.cannabinoids()) {
        Ok(h) => Some(h),
        Err(e) => {
            tracing::warn!("cannot fingerprint sample {}: {}", record.sample_id, e);
            None
        }
    }
}

fn check_uniqueness(
    record: &CoaRecord,
    history: &[CoaRecord],
    policy: UniquenessPolicy,
    issues: &mut Vec<ValidationIssue>,
) -> UniquenessCheck {
    let mut check = UniquenessCheck { policy, ..UniquenessCheck::default() };
    if policy == UniquenessPolicy::Disabled {
        return check;
    }

    check.fingerprint = fingerprint(record);
    let moisture = record.moisture.filter(|m| *m != 0.0);

    for prior in history {
        let prior_id = &prior.sample_id;

        if !check.duplicate_sample_id && prior.sample_id == record.sample_id {
            check.duplicate_sample_id = true;
            issues.push(ValidationIssue::new(
                IssueKind::Uniqueness,
                Severity::Error,
                "sampleId",
                format!("sample ID {} is already in use", record.sample_id),
            ));
        }

        if !check.duplicate_batch_id
            && prior.batch_id == record.batch_id
            && prior.product_type != record.product_type
        {
            check.duplicate_batch_id = true;
            issues.push(ValidationIssue::new(
                IssueKind::Uniqueness,
                Severity::Error,
                "batchId",
                format!(
                    "batch ID {} already used for {} (sample {})",
                    record.batch_id, prior.product_type, prior_id
                ),
            ));
        }

        if !check.duplicate_cannabinoids && check.fingerprint.is_some() && fingerprint(prior) == check.fingerprint {
            check.duplicate_cannabinoids = true;
            issues.push(ValidationIssue::new(
                IssueKind::Uniqueness,
                Severity::Error,
                "cannabinoids",
                format!("cannabinoid values duplicate sample {prior_id}"),
            ));
        }

        if let (false, Some(m), Some(pm)) = (check.duplicate_moisture, moisture, prior.moisture) {
            if m == pm {
                check.duplicate_moisture = true;
                issues.push(
                    ValidationIssue::new(
                        IssueKind::Uniqueness,
                        Severity::Warning,
                        "moisture",
                        format!("moisture {m}% duplicates sample {prior_id}"),
                    )
                    .values(None, Some(m)),
                );
            }
        }
    }
    check
}

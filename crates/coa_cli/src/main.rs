// crates/coa_cli/src/main.rs
//
// Wires up exit codes, typed error mapping, logging, and the three subcommands:
//   generate → batch document (records + seed)
//   dosage   → single edible profile
//   validate → one report per record, each against the records before it

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    /// Bad arguments or input that fails engine-level checks.
    pub const VALIDATION: u8 = 2;
    /// `validate` ran and at least one report is invalid.
    pub const REPORT_INVALID: u8 = 3;
    pub const IO: u8 = 4;
}

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::{parse_and_validate as parse_cli, Args, Command, DosageArgs, GenerateArgs, ValidateArgs};
use coa_core::CustomRanges;
use coa_io::{canonical_json, loader, IoError};
use coa_pipeline::batch::generate_batch_document;
use coa_pipeline::{
    validate_batch, BatchRequest, CoaError, ErrorKind, UniquenessPolicy, ValidationOptions,
    ValidationReport,
};

const DEFAULT_BATCH_ID: &str = "BATCH";

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

impl From<IoError> for MainError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Json { .. } | IoError::Invalid(_) => MainError::Validation(e.to_string()),
            IoError::Path(_) | IoError::Hash(_) => MainError::Io(e.to_string()),
        }
    }
}

impl From<CoaError> for MainError {
    fn from(e: CoaError) -> Self {
        match e.kind {
            ErrorKind::Validation => MainError::Validation(e.message),
            ErrorKind::Generation | ErrorKind::Export | ErrorKind::Unknown => MainError::Io(e.to_string()),
        }
    }
}

fn map_error(e: &MainError) -> u8 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("coa: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION);
        }
    };
    init_tracing(args.quiet);

    let rc = match &args.command {
        Command::Generate(g) => run_generate(g, &args),
        Command::Dosage(d) => run_dosage(d, &args),
        Command::Validate(v) => run_validate(v, &args),
    };
    match rc {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("coa: error: {e}");
            ExitCode::from(map_error(&e))
        }
    }
}

/// `--quiet` pins the filter to `error`; otherwise `RUST_LOG`, defaulting to `warn`.
fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

// ------------------------------------------------------------------------------------------------
// Subcommands
// ------------------------------------------------------------------------------------------------

fn run_generate(g: &GenerateArgs, args: &Args) -> Result<u8, MainError> {
    let request = batch_request_from(g)?;
    let doc = generate_batch_document(&request)?;
    tracing::info!(batch_id = %doc.batch_id, seed = doc.seed, records = doc.records.len(), "batch generated");
    match &g.out {
        Some(path) => loader::write_batch_document(path, &doc, args.pretty)?,
        None => emit_stdout(&doc, args.pretty)?,
    }
    Ok(exitcodes::OK)
}

fn run_dosage(d: &DosageArgs, args: &Args) -> Result<u8, MainError> {
    let profile = coa_algo::convert_dosage(d.dose, &d.mass);
    emit(&profile, d.out.as_deref(), args.pretty)?;
    Ok(exitcodes::OK)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordReport<'a> {
    sample_id: &'a str,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationSummary<'a> {
    is_valid: bool,
    error_count: usize,
    warning_count: usize,
    reports: Vec<RecordReport<'a>>,
}

fn run_validate(v: &ValidateArgs, args: &Args) -> Result<u8, MainError> {
    let records = loader::load_records(&v.input)?;
    let options = ValidationOptions {
        uniqueness: if v.enforce_uniqueness {
            UniquenessPolicy::Enforced
        } else {
            UniquenessPolicy::Disabled
        },
    };
    let reports = validate_batch(&records, &options);

    let summary = ValidationSummary {
        is_valid: reports.iter().all(|r| r.is_valid),
        error_count: reports.iter().map(|r| r.errors.len()).sum(),
        warning_count: reports.iter().map(|r| r.warnings.len()).sum(),
        reports: records
            .iter()
            .zip(reports.iter())
            .map(|(rec, report)| RecordReport { sample_id: &rec.sample_id, report })
            .collect(),
    };
    emit(&summary, v.out.as_deref(), args.pretty)?;

    if !args.quiet {
        eprintln!(
            "validate: {} record(s), {} error(s), {} warning(s)",
            records.len(),
            summary.error_count,
            summary.warning_count
        );
    }
    Ok(if summary.is_valid { exitcodes::OK } else { exitcodes::REPORT_INVALID })
}

// ------------------------------------------------------------------------------------------------
// Helpers
// ------------------------------------------------------------------------------------------------

/// File request (if any) overlaid with explicit flags.
fn batch_request_from(g: &GenerateArgs) -> Result<BatchRequest, MainError> {
    let mut req = match &g.request {
        Some(path) => loader::load_json::<BatchRequest>(path)?,
        None => BatchRequest::new(DEFAULT_BATCH_ID, Vec::new(), 1, Default::default()),
    };

    if let Some(id) = &g.batch_id {
        req.batch_id = id.clone();
    }
    if !g.strains.is_empty() {
        req.strains = g.strains.clone();
    }
    if let Some(count) = g.count {
        req.count = count;
    }
    if let Some(seed) = g.seed {
        req.seed = Some(seed);
    }
    if let Some(product) = g.product_type {
        req.request.product_type = product;
    }
    if let Some(profile) = g.profile_type {
        req.request.profile_type = Some(profile);
    }
    if let Some(dose) = g.dose {
        req.request.edible_dosage = Some(dose);
    }
    if let Some(mass) = &g.mass {
        req.request.sample_size = Some(mass.clone());
    }

    let flags = CustomRanges {
        thca_min: g.thca_min,
        thca_max: g.thca_max,
        d9thc_min: g.d9thc_min,
        d9thc_max: g.d9thc_max,
    };
    if !flags.is_empty() {
        let mut merged = req.request.custom_ranges.unwrap_or_default();
        merged.thca_min = flags.thca_min.or(merged.thca_min);
        merged.thca_max = flags.thca_max.or(merged.thca_max);
        merged.d9thc_min = flags.d9thc_min.or(merged.d9thc_min);
        merged.d9thc_max = flags.d9thc_max.or(merged.d9thc_max);
        req.request.custom_ranges = Some(merged);
    }
    Ok(req)
}

fn emit<T: Serialize>(value: &T, out: Option<&Path>, pretty: bool) -> Result<(), MainError> {
    match (out, pretty) {
        (Some(path), true) => Ok(canonical_json::write_pretty_file(path, value)?),
        (Some(path), false) => Ok(canonical_json::write_canonical_file(path, value)?),
        (None, _) => emit_stdout(value, pretty),
    }
}

fn emit_stdout<T: Serialize>(value: &T, pretty: bool) -> Result<(), MainError> {
    let bytes = if pretty {
        canonical_json::to_pretty_bytes(value)?
    } else {
        let mut b = canonical_json::to_canonical_bytes(value)?;
        b.push(b'\n');
        b
    };
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&bytes)
        .and_then(|_| stdout.flush())
        .map_err(|e| MainError::Io(format!("stdout: {e}")))
}

// crates/coa_cli/src/args.rs
//
// CLI argument surface (clap derive) plus light post-parse checks.
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - `--request` and the input file of `validate` must exist
// - Seed is a u64 in decimal or 0x-hex (up to 16 nybbles)

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};

use coa_core::{ProductType, ProfileType};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "coa",
    version,
    disable_help_subcommand = true,
    about = "Generate and validate cannabis potency profiles (COA bodies)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Only log errors (overrides RUST_LOG).
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Indented JSON instead of canonical compact JSON.
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a batch of COA records.
    Generate(GenerateArgs),
    /// Convert an edible dose into a potency profile.
    Dosage(DosageArgs),
    /// Validate COA records (single record, array, or batch document).
    Validate(ValidateArgs),
}

#[derive(Debug, ClapArgs, Clone)]
pub struct GenerateArgs {
    /// Batch request JSON; flags below override its fields.
    #[arg(long)]
    pub request: Option<PathBuf>,

    #[arg(long)]
    pub batch_id: Option<String>,

    /// Strain name; repeat for several (records rotate through them).
    #[arg(long = "strain")]
    pub strains: Vec<String>,

    /// Number of records (1..=100).
    #[arg(long, allow_negative_numbers = true)]
    pub count: Option<i64>,

    /// Batch seed. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub product_type: Option<ProductType>,

    /// Defaults to the product type's profile.
    #[arg(long)]
    pub profile_type: Option<ProfileType>,

    #[arg(long)]
    pub thca_min: Option<f64>,
    #[arg(long)]
    pub thca_max: Option<f64>,
    #[arg(long)]
    pub d9thc_min: Option<f64>,
    #[arg(long)]
    pub d9thc_max: Option<f64>,

    /// Edible dose in mg (edible product type only).
    #[arg(long)]
    pub dose: Option<f64>,

    /// Sample mass for the dose, e.g. "3.5g" or "500mg".
    #[arg(long)]
    pub mass: Option<String>,

    /// Write the batch document here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct DosageArgs {
    /// Dose in mg.
    #[arg(long, allow_negative_numbers = true)]
    pub dose: f64,

    #[arg(long, default_value = "3.5g")]
    pub mass: String,

    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ValidateArgs {
    /// Records to validate.
    pub input: PathBuf,

    /// Turn on duplicate detection against preceding records.
    #[arg(long)]
    pub enforce_uniqueness: bool,

    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Errors surfaced by post-parse checks. Messages are short and stable.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

fn ensure_local_file(p: &Path) -> Result<(), CliError> {
    ensure_local_path(p)?;
    if p.is_file() {
        Ok(())
    } else {
        Err(CliError::NotFound(p.display().to_string()))
    }
}

impl Args {
    fn check(&self) -> Result<(), CliError> {
        match &self.command {
            Command::Generate(g) => {
                if let Some(req) = &g.request {
                    ensure_local_file(req)?;
                }
                g.out.as_deref().map_or(Ok(()), ensure_local_path)
            }
            Command::Dosage(d) => d.out.as_deref().map_or(Ok(()), ensure_local_path),
            Command::Validate(v) => {
                ensure_local_file(&v.input)?;
                v.out.as_deref().map_or(Ok(()), ensure_local_path)
            }
        }
    }
}

/// Entry point used by main.rs. Clap itself exits with code 2 on usage errors.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    args.check()?;
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parsing() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0xff").unwrap(), 255);
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0x11112222333344445").is_err());
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn schemes_are_rejected() {
        assert!(has_scheme("https://example.com/a.json"));
        assert!(has_scheme("file:/tmp/x"));
        assert!(!has_scheme("batch.json"));
        assert!(matches!(
            ensure_local_path(Path::new("http://x/y.json")),
            Err(CliError::NonLocalPath(_))
        ));
    }

    #[test]
    fn generate_flags_parse() {
        let args = Args::try_parse_from([
            "coa", "generate", "--product-type", "pre-roll", "--profile-type", "medium-thc",
            "--strain", "A", "--strain", "B", "--count", "3", "--seed", "0x10", "--pretty",
        ])
        .unwrap();
        assert!(args.pretty);
        match args.command {
            Command::Generate(g) => {
                assert_eq!(g.product_type, Some(ProductType::PreRoll));
                assert_eq!(g.profile_type, Some(ProfileType::MediumThc));
                assert_eq!(g.strains, ["A", "B"]);
                assert_eq!(g.count, Some(3));
                assert_eq!(g.seed, Some(16));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_profile_token_is_usage_error() {
        assert!(Args::try_parse_from(["coa", "generate", "--profile-type", "ultra"]).is_err());
    }

    #[test]
    fn missing_validate_input_is_not_found() {
        let args = Args::try_parse_from(["coa", "validate", "/no/such/records.json"]).unwrap();
        assert!(matches!(args.check(), Err(CliError::NotFound(_))));
    }
}

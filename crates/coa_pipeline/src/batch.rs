//! Batch generation: many independent COA records from one request.
//!
//! Record `i` (0-based) gets strain `strains[i % len]`, sample ID
//! `<batchId>-<i+1:03>`, and its own RNG stream `SampleRng::for_batch_entry(seed, i)`,
//! so any single record can be regenerated without replaying the others.
//! Flower-class records carry a moisture value in `[8, 13]`%; edibles carry none.
//!
//! The loop is sequential; a batch is capped at `MAX_BATCH_SIZE` records.

use coa_algo::generate_for_request;
use coa_core::rng::entropy_seed;
use coa_core::rounding::{round_to, FLOWER_DECIMALS};
use coa_core::{CoaRecord, GenerationRequest, PotencyRng, ProductClass, SampleRng};
use coa_io::loader::{BatchDocument, EngineMeta};
use serde::{Deserialize, Serialize};

use crate::validate::{validate, ValidationOptions, ValidationReport};
use crate::CoaError;

pub const MAX_BATCH_SIZE: i64 = 100;

/// Moisture drawn for flower-class records (% w/w).
pub const GENERATED_MOISTURE: (f64, f64) = (8.0, 13.0);

fn default_count() -> i64 {
    1
}

/// A batch order: identity, strain rotation, size, seed, and the shared
/// generation knobs (flattened, so the JSON reads as one object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub batch_id: String,
    #[serde(default)]
    pub strains: Vec<String>,
    /// Signed so that out-of-range sizes (0, negative) reach validation instead of
    /// failing deserialization.
    #[serde(default = "default_count")]
    pub count: i64,
    /// Absent → a fresh OS seed, echoed in the resulting document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub request: GenerationRequest,
}

impl BatchRequest {
    pub fn new(batch_id: impl Into<String>, strains: Vec<String>, count: i64, request: GenerationRequest) -> Self {
        Self {
            batch_id: batch_id.into(),
            strains,
            count,
            seed: None,
            request,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn check(&self) -> Result<(usize, Vec<&str>), CoaError> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.count) {
            return Err(CoaError::validation(format!(
                "batch size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.count
            )));
        }
        if self.batch_id.trim().is_empty() {
            return Err(CoaError::validation("batch ID must not be empty"));
        }
        let strains: Vec<&str> = self
            .strains
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if strains.is_empty() {
            return Err(CoaError::validation("strain list must not be empty"));
        }
        // count is within 1..=100 here
        Ok((self.count as usize, strains))
    }
}

/// Generate the records of a batch.
pub fn generate_batch(request: &BatchRequest) -> Result<Vec<CoaRecord>, CoaError> {
    Ok(generate_batch_document(request)?.records)
}

/// Generate a batch and wrap it with the seed actually used.
pub fn generate_batch_document(request: &BatchRequest) -> Result<BatchDocument, CoaError> {
    let (count, strains) = request.check()?;
    let seed = request.seed.unwrap_or_else(entropy_seed);
    let batch_id = request.batch_id.trim();
    tracing::debug!(batch_id, count, seed, "generating batch");

    let records = (0..count)
        .map(|i| {
            let strain = strains[i % strains.len()];
            let record = generate_record(&request.request, batch_id, strain, seed, i);
            tracing::debug!(sample_id = %record.sample_id, strain, "generated record");
            record
        })
        .collect();

    Ok(BatchDocument {
        engine: EngineMeta::default(),
        batch_id: batch_id.to_string(),
        seed,
        records,
    })
}

/// Record `index` of a batch; depends only on its arguments.
pub fn generate_record(
    request: &GenerationRequest,
    batch_id: &str,
    strain: &str,
    seed: u64,
    index: usize,
) -> CoaRecord {
    let mut rng = SampleRng::for_batch_entry(seed, index as u64);
    let profile = generate_for_request(request, &mut rng);
    let moisture = match request.product_class() {
        ProductClass::Flower => {
            let (lo, hi) = GENERATED_MOISTURE;
            Some(round_to(rng.uniform(lo, hi), FLOWER_DECIMALS))
        }
        ProductClass::Edible => None,
    };
    CoaRecord {
        batch_id: batch_id.to_string(),
        sample_id: format!("{}-{:03}", batch_id, index + 1),
        strain_name: Some(strain.to_string()),
        product_type: request.product_type,
        profile_type: request.resolved_profile_type(),
        moisture,
        profile,
    }
}

/// Validate each record against the records that precede it.
pub fn validate_batch(records: &[CoaRecord], options: &ValidationOptions) -> Vec<ValidationReport> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| validate(r, &records[..i], options))
        .collect()
}

//! Loader: read local JSON inputs (generation requests, COA records, batch
//! documents) with a size cap, and write batch documents back out.
//! No network I/O.
//!
//! `load_records` accepts three shapes so that a batch written by `coa generate`
//! can be fed straight into `coa validate`:
//! - a single record object,
//! - an array of records,
//! - a batch document `{ "records": [...] , ... }`.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use coa_core::{CoaRecord, GenerationRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical_json::{write_canonical_file, write_pretty_file};
use crate::{IoError, IoResult};

/// Inputs are small; anything larger is rejected before parsing.
pub const MAX_INPUT_BYTES: u64 = 4 * 1024 * 1024;

pub const ENGINE_NAME: &str = "coa-engine";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ----------------------------- Wire-facing types -----------------------------

/// Producer stamp carried by every batch document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

impl Default for EngineMeta {
    fn default() -> Self {
        Self {
            name: ENGINE_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
        }
    }
}

/// A generated batch as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDocument {
    #[serde(default)]
    pub engine: EngineMeta,
    pub batch_id: String,
    /// Seed actually used; replaying with it reproduces the records.
    pub seed: u64,
    pub records: Vec<CoaRecord>,
}

// ----------------------------- Readers -----------------------------

/// Read a file into a `Value`, refusing anything over `MAX_INPUT_BYTES`.
pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Path(format!(
            "{}: exceeds {} bytes",
            path.display(),
            MAX_INPUT_BYTES
        )));
    }
    Ok(serde_json::from_slice(&buf)?)
}

/// Read and deserialize any JSON input.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> IoResult<T> {
    let v = read_json_value_with_limits(path)?;
    from_value_at(v, "/")
}

pub fn load_generation_request(path: &Path) -> IoResult<GenerationRequest> {
    load_json(path)
}

/// Read COA records from any of the accepted shapes.
pub fn load_records(path: &Path) -> IoResult<Vec<CoaRecord>> {
    records_from_value(read_json_value_with_limits(path)?)
}

/// Shape dispatch for `load_records`, split out for in-memory inputs.
pub fn records_from_value(v: Value) -> IoResult<Vec<CoaRecord>> {
    match v {
        Value::Array(items) => collect_records(items, ""),
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => collect_records(items, "/records"),
            Some(_) => Err(IoError::Invalid("`records` must be an array".into())),
            None => Ok(vec![from_value_at(Value::Object(map), "/")?]),
        },
        _ => Err(IoError::Invalid(
            "expected a record, an array of records, or a batch document".into(),
        )),
    }
}

fn collect_records(items: Vec<Value>, prefix: &str) -> IoResult<Vec<CoaRecord>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| from_value_at(item, &format!("{prefix}/{i}")))
        .collect()
}

fn from_value_at<T: DeserializeOwned>(v: Value, pointer: &str) -> IoResult<T> {
    serde_json::from_value(v).map_err(|e| IoError::Json {
        pointer: pointer.to_string(),
        msg: e.to_string(),
    })
}

// ----------------------------- Writers -----------------------------

/// Write a batch document; canonical (compact) unless `pretty`.
pub fn write_batch_document(path: &Path, doc: &BatchDocument, pretty: bool) -> IoResult<()> {
    if pretty {
        write_pretty_file(path, doc)
    } else {
        write_canonical_file(path, doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coa_core::{PotencyProfile, PotencyTotals, ProductType, ProfileType};
    use serde_json::json;

    fn record(sample: &str) -> CoaRecord {
        CoaRecord {
            batch_id: "B-7".into(),
            sample_id: sample.into(),
            strain_name: Some("Blue Dream".into()),
            product_type: ProductType::Flower,
            profile_type: ProfileType::HighThc,
            moisture: Some(11.2),
            profile: PotencyProfile::new(Vec::new(), PotencyTotals::default()),
        }
    }

    #[test]
    fn accepts_single_array_and_document_shapes() {
        let one = serde_json::to_value(record("B-7-001")).unwrap();
        assert_eq!(records_from_value(one.clone()).unwrap().len(), 1);
        assert_eq!(records_from_value(json!([one.clone(), one.clone()])).unwrap().len(), 2);
        let doc = json!({"batchId":"B-7","seed":1,"records":[one]});
        assert_eq!(records_from_value(doc).unwrap()[0].sample_id, "B-7-001");
    }

    #[test]
    fn bad_element_reports_its_pointer() {
        let good = serde_json::to_value(record("B-7-001")).unwrap();
        let err = records_from_value(json!({"records":[good, {"batchId": 3}]})).unwrap_err();
        match err {
            IoError::Json { pointer, .. } => assert_eq!(pointer, "/records/1"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(records_from_value(json!(42)), Err(IoError::Invalid(_))));
    }

    #[test]
    fn batch_document_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        let doc = BatchDocument {
            engine: EngineMeta::default(),
            batch_id: "B-7".into(),
            seed: 99,
            records: vec![record("B-7-001"), record("B-7-002")],
        };
        write_batch_document(&path, &doc, false).unwrap();
        let back: BatchDocument = load_json(&path).unwrap();
        assert_eq!(back, doc);
        assert_eq!(load_records(&path).unwrap().len(), 2);

        let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_json_diff::assert_json_include!(
            actual: on_disk,
            expected: json!({"batchId":"B-7","seed":99,"engine":{"name":"coa-engine"}})
        );
    }

    #[test]
    fn request_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        std::fs::write(&path, r#"{"productType":"edible","edibleDosage":10}"#).unwrap();
        let req = load_generation_request(&path).unwrap();
        assert_eq!(req.product_type, ProductType::Edible);
        assert_eq!(req.edible_dosage, Some(10.0));
        assert!(req.uses_dosage());
    }

    #[test]
    fn missing_file_is_path_error() {
        let err = load_records(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, IoError::Path(_)));
    }
}

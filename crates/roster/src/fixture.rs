//! Reading and writing trainer fixture documents.
//!
//! A fixture is a JSON document of the form `{ "trainers": [ ... ] }`.

use crate::record::TrainerRecord;
use framework::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUNDLED_FIXTURE: &str = include_str!("../data/trainers.json");

#[derive(Serialize, Deserialize)]
struct FixtureDocument {
    trainers: Vec<TrainerRecord>,
}

/// Parses a fixture document, keeping the document's record order.
/// Fails if two records share an identifier.
pub fn parse_fixture(text: &str) -> Result<Vec<TrainerRecord>> {
    let document: FixtureDocument = serde_json::from_str(text)?;

    let mut seen = HashSet::new();
    for record in &document.trainers {
        if !seen.insert(record.id) {
            return Err(Error::Fixture(format!("duplicate trainer id {}", record.id)));
        }
    }

    Ok(document.trainers)
}

/// Reads a fixture document from disk.
pub fn load_fixture(path: &Path) -> Result<Vec<TrainerRecord>> {
    let text = std::fs::read_to_string(path)?;
    let records = parse_fixture(&text)?;
    tracing::info!(path = %path.display(), count = records.len(), "loaded fixture");
    Ok(records)
}

/// The sample roster shipped with the application.
pub fn bundled_fixture() -> Result<Vec<TrainerRecord>> {
    parse_fixture(BUNDLED_FIXTURE)
}

/// Serializes records back into a fixture document.
pub fn to_fixture(records: &[TrainerRecord]) -> Result<String> {
    let document = FixtureDocument {
        trainers: records.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

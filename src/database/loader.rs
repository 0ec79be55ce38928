//! Product-definition file loader.
//!
//! Reads a CSV with one row per `DatabaseEntity`: key name, the seven axis
//! lengths, and a `;`-separated data column, mirroring the CSV loader shape
//! used throughout this codebase's other assumption loaders.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::database::entity::{DatabaseEntity, NUMBER_OF_AXES};
use crate::database::keys::DatabaseKey;

#[derive(Debug, Deserialize)]
struct EntityRow {
    key: DatabaseKey,
    gender_len: usize,
    class_len: usize,
    smoking_len: usize,
    issue_age_len: usize,
    uw_basis_len: usize,
    state_len: usize,
    duration_len: usize,
    data: String,
}

/// Load a product-definition file into a key→entity map.
pub fn load_product(path: &Path) -> Result<HashMap<DatabaseKey, DatabaseEntity>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut entities = HashMap::new();

    for result in reader.deserialize() {
        let row: EntityRow = result?;
        let axis_lengths: [usize; NUMBER_OF_AXES] = [
            row.gender_len,
            row.class_len,
            row.smoking_len,
            row.issue_age_len,
            row.uw_basis_len,
            row.state_len,
            row.duration_len,
        ];
        let data: Vec<f64> = row
            .data
            .split(';')
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<_, _>>()?;
        let entity = DatabaseEntity::new(row.key, axis_lengths, data)?;
        log::debug!("loaded database entity {:?} ({} values)", row.key, entity.length());
        entities.insert(row.key, entity);
    }

    log::debug!("loaded {} database entities from {}", entities.len(), path.display());
    Ok(entities)
}

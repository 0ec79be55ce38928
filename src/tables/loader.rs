//! Rate-table file loader.
//!
//! Reads a CSV with one row per (table_id, age, value) triple — many
//! tables may share a file, selected by `table_id` — mirroring the
//! row-per-fact CSV shape used by this codebase's other loaders.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::tables::ActuarialTable;

#[derive(Debug, Deserialize)]
struct TableRow {
    table_id: u32,
    age: usize,
    value: f64,
}

/// Load every table in a rate-table file, keyed by table id.
pub fn load_tables(path: &Path) -> Result<HashMap<u32, ActuarialTable>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let mut by_table: HashMap<u32, Vec<(usize, f64)>> = HashMap::new();
    for result in reader.deserialize() {
        let row: TableRow = result?;
        by_table.entry(row.table_id).or_default().push((row.age, row.value));
    }

    let mut tables = HashMap::new();
    for (table_id, mut rows) in by_table {
        rows.sort_by_key(|&(age, _)| age);
        let rates: Vec<f64> = rows.into_iter().map(|(_, value)| value).collect();
        log::debug!("loaded table {table_id} from {} ({} ages)", path.display(), rates.len());
        tables.insert(table_id, ActuarialTable::attained_age(rates));
    }

    Ok(tables)
}

/// Load a single table by id from a rate-table file.
pub fn load_table(path: &Path, table_id: u32) -> Result<ActuarialTable, Box<dyn std::error::Error>> {
    let tables = load_tables(path)?;
    tables
        .into_iter()
        .find(|(id, _)| *id == table_id)
        .map(|(_, table)| table)
        .ok_or_else(|| format!("table id {table_id} not found in {}", path.display()).into())
}

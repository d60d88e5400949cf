use super::store::{write_cached_shifts, SnapshotStore, StoreError};
use crate::schedule::RawShiftRecord;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read shift export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid shift CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One row of the spreadsheet's shift sheet exported as CSV.
#[derive(Debug, Deserialize)]
struct ShiftRow {
    #[serde(rename = "date")]
    date: String,
    #[serde(rename = "staffId")]
    staff_id: String,
    #[serde(rename = "staffName", default, deserialize_with = "empty_string_as_none")]
    staff_name: Option<String>,
    #[serde(rename = "slotId")]
    slot_id: String,
}

impl ShiftRow {
    fn into_raw(self) -> RawShiftRecord {
        RawShiftRecord {
            date: Some(Value::String(self.date)),
            staff_id: Some(Value::String(self.staff_id)),
            staff_name: self.staff_name.map(Value::String),
            slot_id: Some(Value::String(self.slot_id)),
            extra: Map::new(),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub fn parse_shift_csv<R: Read>(reader: R) -> Result<Vec<RawShiftRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<ShiftRow>()
        .map(|row| row.map(ShiftRow::into_raw))
        .collect()
}

/// Replaces the cached snapshot with the rows of a CSV export.
pub fn import_csv<S, R>(store: &S, reader: R) -> Result<usize, ImportError>
where
    S: SnapshotStore + ?Sized,
    R: Read,
{
    let records = parse_shift_csv(reader)?;
    write_cached_shifts(store, &records)?;
    Ok(records.len())
}

pub fn import_csv_path<S, P>(store: &S, path: P) -> Result<usize, ImportError>
where
    S: SnapshotStore + ?Sized,
    P: AsRef<std::path::Path>,
{
    let file = std::fs::File::open(path)?;
    import_csv(store, file)
}

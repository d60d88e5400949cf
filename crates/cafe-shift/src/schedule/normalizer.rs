use super::domain::{RawShiftRecord, ShiftRecord};
use serde_json::Value;

pub fn normalize(raw: &RawShiftRecord) -> ShiftRecord {
    let date = canonical_string(raw.date.as_ref());
    let date = match date.split_once('T') {
        Some((day, _)) => day.to_string(),
        None => date,
    };

    ShiftRecord {
        date,
        staff_id: canonical_string(raw.staff_id.as_ref()),
        staff_name: canonical_string(raw.staff_name.as_ref()),
        slot_id: canonical_string(raw.slot_id.as_ref()),
    }
}

pub fn normalize_all(raw: &[RawShiftRecord]) -> Vec<ShiftRecord> {
    raw.iter().map(normalize).collect()
}

fn canonical_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => {
            if let Some(int) = number.as_i64() {
                int.to_string()
            } else if let Some(int) = number.as_u64() {
                int.to_string()
            } else {
                match number.as_f64() {
                    // Spreadsheet cells often come through as 7.0.
                    Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
                        format!("{}", float as i64)
                    }
                    Some(float) => float.to_string(),
                    None => number.to_string(),
                }
            }
        }
        Some(other) => other.to_string(),
    }
}

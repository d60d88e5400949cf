use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a calendar date the way shift records store it (`YYYY-MM-DD`).
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A shift submission after normalization. Identifiers and the date are always
/// plain strings so matching is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub date: String,
    pub staff_id: String,
    pub staff_name: String,
    pub slot_id: String,
}

impl ShiftRecord {
    pub fn assigned_staff(&self) -> AssignedStaff {
        AssignedStaff {
            staff_id: self.staff_id.clone(),
            staff_name: self.staff_name.clone(),
        }
    }
}

/// A shift record exactly as the spreadsheet API or the local cache hands it
/// over. Field values may be strings, numbers, or missing entirely; anything
/// else on the object rides along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShiftRecord {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// `None` means the key was absent; an explicit null stays `Some(Value::Null)`
// so cache rewrites reproduce the payload as received.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl From<&ShiftRecord> for RawShiftRecord {
    fn from(record: &ShiftRecord) -> Self {
        Self {
            date: Some(Value::String(record.date.clone())),
            staff_id: Some(Value::String(record.staff_id.clone())),
            staff_name: Some(Value::String(record.staff_name.clone())),
            slot_id: Some(Value::String(record.slot_id.clone())),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedStaff {
    pub staff_id: String,
    pub staff_name: String,
}

/// Staffing classification of a single (date, slot) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Closed,
    Mine,
    Full,
    Available,
    Shortage,
}

impl SlotStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Closed => "Closed",
            Self::Mine => "Mine",
            Self::Full => "Full",
            Self::Available => "Available",
            Self::Shortage => "Shortage",
        }
    }

    /// Single-character marker for plain-text calendars.
    pub const fn marker(self) -> char {
        match self {
            Self::Closed => '-',
            Self::Mine => '*',
            Self::Full => '#',
            Self::Available => '+',
            Self::Shortage => '!',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Leader,
    Staff,
}

impl StaffRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leader => "Leader",
            Self::Staff => "Staff",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
}

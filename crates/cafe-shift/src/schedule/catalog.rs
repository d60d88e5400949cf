use super::domain::{StaffMember, StaffRole};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// A named operating window within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub id: String,
    pub label: String,
    #[serde(with = "clock_time")]
    pub start: NaiveTime,
    #[serde(with = "clock_time")]
    pub end: NaiveTime,
    pub required_staff: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl OperationPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |date| *date <= self.end)
    }
}

/// Default slot list for every occurrence of a weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySlots {
    pub weekday: Weekday,
    pub slots: Vec<String>,
}

/// Replaces the weekday pattern for one date. An empty list closes the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read schedule file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid schedule JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("operation period starts on {start} after it ends on {end}")]
    InvertedPeriod { start: NaiveDate, end: NaiveDate },
    #[error("slot id '{0}' is defined more than once")]
    DuplicateSlot(String),
    #[error("staff id '{0}' appears more than once in the roster")]
    DuplicateStaff(String),
    #[error("weekday {0} has more than one slot pattern")]
    DuplicateWeekday(Weekday),
    #[error("date {0} is overridden more than once")]
    DuplicateOverride(NaiveDate),
    #[error("operating calendar references unknown slot '{0}'")]
    UnknownSlot(String),
}

/// Static lookup tables for one deployment: roster, slots, and the operating
/// calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCatalog {
    pub roster: Vec<StaffMember>,
    pub slots: Vec<SlotDefinition>,
    pub period: OperationPeriod,
    #[serde(default)]
    pub weekly_slots: Vec<WeekdaySlots>,
    #[serde(default)]
    pub date_overrides: Vec<DateOverride>,
    #[serde(default = "default_required_staff")]
    pub default_required_staff: u32,
}

fn default_required_staff() -> u32 {
    1
}

impl ScheduleCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.period.start > self.period.end {
            return Err(CatalogError::InvertedPeriod {
                start: self.period.start,
                end: self.period.end,
            });
        }

        let mut slot_ids = HashSet::new();
        for slot in &self.slots {
            if !slot_ids.insert(slot.id.as_str()) {
                return Err(CatalogError::DuplicateSlot(slot.id.clone()));
            }
        }

        let mut staff_ids = HashSet::new();
        for member in &self.roster {
            if !staff_ids.insert(member.id.as_str()) {
                return Err(CatalogError::DuplicateStaff(member.id.clone()));
            }
        }

        let mut weekdays = HashSet::new();
        for pattern in &self.weekly_slots {
            if !weekdays.insert(pattern.weekday) {
                return Err(CatalogError::DuplicateWeekday(pattern.weekday));
            }
        }

        let mut override_dates = HashSet::new();
        for entry in &self.date_overrides {
            if !override_dates.insert(entry.date) {
                return Err(CatalogError::DuplicateOverride(entry.date));
            }
        }

        let referenced = self
            .weekly_slots
            .iter()
            .flat_map(|pattern| pattern.slots.iter())
            .chain(
                self.date_overrides
                    .iter()
                    .flat_map(|entry| entry.slots.iter()),
            );
        for slot_id in referenced {
            if !slot_ids.contains(slot_id.as_str()) {
                return Err(CatalogError::UnknownSlot(slot_id.clone()));
            }
        }

        Ok(())
    }

    pub fn slot(&self, slot_id: &str) -> Option<&SlotDefinition> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }

    pub fn staff(&self, staff_id: &str) -> Option<&StaffMember> {
        self.roster.iter().find(|member| member.id == staff_id)
    }

    /// Minimum headcount for a slot. Unknown slots use the catalog default.
    pub fn required_staff(&self, slot_id: &str) -> u32 {
        self.slot(slot_id)
            .map(|slot| slot.required_staff)
            .unwrap_or(self.default_required_staff)
    }

    /// Slots running on `date`, in catalog order. Empty outside the period.
    pub fn available_slots(&self, date: NaiveDate) -> Vec<&SlotDefinition> {
        if !self.period.contains(date) {
            return Vec::new();
        }

        let scheduled = self.scheduled_slot_ids(date);
        self.slots
            .iter()
            .filter(|slot| scheduled.iter().any(|id| *id == slot.id))
            .collect()
    }

    pub fn is_slot_available(&self, date: NaiveDate, slot_id: &str) -> bool {
        self.available_slots(date)
            .iter()
            .any(|slot| slot.id == slot_id)
    }

    pub fn is_operating_day(&self, date: NaiveDate) -> bool {
        !self.available_slots(date).is_empty()
    }

    pub fn operating_dates(&self) -> Vec<NaiveDate> {
        self.period
            .dates()
            .filter(|date| self.is_operating_day(*date))
            .collect()
    }

    fn scheduled_slot_ids(&self, date: NaiveDate) -> &[String] {
        if let Some(entry) = self
            .date_overrides
            .iter()
            .find(|entry| entry.date == date)
        {
            return &entry.slots;
        }

        self.weekly_slots
            .iter()
            .find(|pattern| pattern.weekday == date.weekday())
            .map(|pattern| pattern.slots.as_slice())
            .unwrap_or(&[])
    }

    /// Built-in schedule used when no schedule file is configured.
    pub fn standard() -> Self {
        let slot = |id: &str, label: &str, start: (u32, u32), end: (u32, u32), required| {
            SlotDefinition {
                id: id.to_string(),
                label: label.to_string(),
                start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap_or_default(),
                end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap_or_default(),
                required_staff: required,
            }
        };
        let member = |id: &str, name: &str, role| StaffMember {
            id: id.to_string(),
            name: name.to_string(),
            role,
        };
        let weekday = |weekday, slots: &[&str]| WeekdaySlots {
            weekday,
            slots: slots.iter().map(|id| id.to_string()).collect(),
        };

        Self {
            roster: vec![
                member("S001", "Aiko Tanaka", StaffRole::Leader),
                member("S002", "Kenji Sato", StaffRole::Staff),
                member("S003", "Mika Suzuki", StaffRole::Staff),
                member("S004", "Ren Ito", StaffRole::Leader),
                member("S005", "Yui Kobayashi", StaffRole::Staff),
                member("S006", "Sora Watanabe", StaffRole::Staff),
            ],
            slots: vec![
                slot("morning", "Morning", (10, 0), (13, 0), 2),
                slot("afternoon", "Afternoon", (13, 0), (16, 0), 2),
                slot("evening", "Evening", (16, 0), (19, 0), 1),
            ],
            period: OperationPeriod {
                start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
                end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default(),
            },
            weekly_slots: vec![
                weekday(Weekday::Tue, &["morning", "afternoon", "evening"]),
                weekday(Weekday::Wed, &["morning", "afternoon", "evening"]),
                weekday(Weekday::Thu, &["morning", "afternoon", "evening"]),
                weekday(Weekday::Fri, &["morning", "afternoon", "evening"]),
                weekday(Weekday::Sat, &["morning", "afternoon"]),
                weekday(Weekday::Sun, &["morning", "afternoon"]),
            ],
            date_overrides: Vec::new(),
            default_required_staff: default_required_staff(),
        }
    }
}

/// `HH:MM` clock times in schedule files.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub(super) fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date")
    }

    #[test]
    fn standard_schedule_closes_mondays() {
        let catalog = ScheduleCatalog::standard();
        // 2024-06-03 is a Monday.
        assert!(!catalog.is_operating_day(date(3)));
        assert!(catalog.is_operating_day(date(4)));
        assert_eq!(catalog.available_slots(date(1)).len(), 2);
        assert_eq!(catalog.available_slots(date(4)).len(), 3);
    }

    #[test]
    fn dates_outside_period_have_no_slots() {
        let catalog = ScheduleCatalog::standard();
        let july = NaiveDate::from_ymd_opt(2024, 7, 2).expect("valid date");
        assert!(catalog.available_slots(july).is_empty());
        assert!(!catalog.is_slot_available(july, "morning"));
    }

    #[test]
    fn overrides_replace_weekday_pattern() {
        let mut catalog = ScheduleCatalog::standard();
        catalog.date_overrides.push(DateOverride {
            date: date(4),
            slots: vec!["evening".to_string()],
        });
        catalog.date_overrides.push(DateOverride {
            date: date(5),
            slots: Vec::new(),
        });

        let slots: Vec<_> = catalog
            .available_slots(date(4))
            .iter()
            .map(|slot| slot.id.as_str())
            .collect();
        assert_eq!(slots, vec!["evening"]);
        assert!(!catalog.is_operating_day(date(5)));
    }

    #[test]
    fn required_staff_falls_back_to_default() {
        let catalog = ScheduleCatalog::standard();
        assert_eq!(catalog.required_staff("morning"), 2);
        assert_eq!(catalog.required_staff("evening"), 1);
        assert_eq!(catalog.required_staff("brunch"), 1);
    }

    #[test]
    fn operating_dates_skip_closed_days() {
        let catalog = ScheduleCatalog::standard();
        let dates = catalog.operating_dates();
        // June 2024 has four Mondays.
        assert_eq!(dates.len(), 26);
        assert!(!dates.contains(&date(3)));
    }

    #[test]
    fn from_reader_parses_clock_times_and_weekdays() {
        let json = r#"{
            "roster": [{ "id": "7", "name": "Hana", "role": "leader" }],
            "slots": [{ "id": "3", "label": "Late", "start": "18:30", "end": "21:00", "required_staff": 0 }],
            "period": { "start": "2024-06-01", "end": "2024-06-07" },
            "weekly_slots": [{ "weekday": "Sat", "slots": ["3"] }]
        }"#;

        let catalog = ScheduleCatalog::from_reader(Cursor::new(json)).expect("catalog parses");
        let slot = catalog.slot("3").expect("slot present");
        assert_eq!(slot.start, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(catalog.default_required_staff, 1);
        assert_eq!(catalog.operating_dates(), vec![date(1)]);
    }

    #[test]
    fn validation_rejects_unknown_slot_references() {
        let mut catalog = ScheduleCatalog::standard();
        catalog.weekly_slots.push(WeekdaySlots {
            weekday: Weekday::Mon,
            slots: vec!["brunch".to_string()],
        });

        match catalog.validate() {
            Err(CatalogError::UnknownSlot(id)) => assert_eq!(id, "brunch"),
            other => panic!("expected unknown slot error, got {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_inverted_period() {
        let mut catalog = ScheduleCatalog::standard();
        catalog.period = OperationPeriod {
            start: date(30),
            end: date(1),
        };
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvertedPeriod { .. })
        ));
    }

    #[test]
    fn validation_rejects_repeated_ids() {
        let mut catalog = ScheduleCatalog::standard();
        let morning = catalog.slots[0].clone();
        catalog.slots.push(morning);
        match catalog.validate() {
            Err(CatalogError::DuplicateSlot(id)) => assert_eq!(id, "morning"),
            other => panic!("expected duplicate slot error, got {other:?}"),
        }

        let mut catalog = ScheduleCatalog::standard();
        let leader = catalog.roster[0].clone();
        catalog.roster.push(leader);
        match catalog.validate() {
            Err(CatalogError::DuplicateStaff(id)) => assert_eq!(id, "S001"),
            other => panic!("expected duplicate staff error, got {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_repeated_weekday_patterns() {
        let mut catalog = ScheduleCatalog::standard();
        catalog.weekly_slots.push(WeekdaySlots {
            weekday: Weekday::Tue,
            slots: vec!["evening".to_string()],
        });

        match catalog.validate() {
            Err(CatalogError::DuplicateWeekday(day)) => assert_eq!(day, Weekday::Tue),
            other => panic!("expected duplicate weekday error, got {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_repeated_override_dates() {
        let mut catalog = ScheduleCatalog::standard();
        for slots in [vec![], vec!["morning".to_string()]] {
            catalog.date_overrides.push(DateOverride {
                date: date(15),
                slots,
            });
        }

        match catalog.validate() {
            Err(CatalogError::DuplicateOverride(day)) => assert_eq!(day, date(15)),
            other => panic!("expected duplicate override error, got {other:?}"),
        }
    }
}

use super::catalog::ScheduleCatalog;
use super::domain::{date_key, AssignedStaff, ShiftRecord, SlotStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// Staffing picture for one slot on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotEvaluation {
    pub date: NaiveDate,
    pub slot_id: String,
    pub is_operating: bool,
    pub count: usize,
    pub required: usize,
    pub status: SlotStatus,
    pub status_label: &'static str,
    pub assigned_staff: Vec<AssignedStaff>,
}

impl SlotEvaluation {
    pub fn is_staffed(&self) -> bool {
        self.is_operating && self.count >= self.required
    }

    /// Headcount still missing; zero once the slot is staffed.
    pub fn remaining(&self) -> usize {
        self.required.saturating_sub(self.count)
    }
}

struct SlotFacts {
    count: usize,
    required: usize,
    viewer_assigned: bool,
}

type ClassificationRule = fn(&SlotFacts) -> bool;

// First match wins. A viewer's own slot is always reported as theirs, even
// when it is also fully staffed.
const CLASSIFICATION_RULES: [(SlotStatus, ClassificationRule); 4] = [
    (SlotStatus::Mine, viewer_is_assigned),
    (SlotStatus::Full, meets_requirement),
    (SlotStatus::Available, partially_staffed),
    (SlotStatus::Shortage, unstaffed),
];

fn viewer_is_assigned(facts: &SlotFacts) -> bool {
    facts.viewer_assigned
}

fn meets_requirement(facts: &SlotFacts) -> bool {
    facts.count >= facts.required
}

fn partially_staffed(facts: &SlotFacts) -> bool {
    facts.count > 0 && facts.count < facts.required
}

fn unstaffed(facts: &SlotFacts) -> bool {
    facts.count == 0
}

fn classify(facts: &SlotFacts) -> SlotStatus {
    CLASSIFICATION_RULES
        .iter()
        .find(|(_, rule)| rule(facts))
        .map(|(status, _)| *status)
        .unwrap_or(SlotStatus::Shortage)
}

/// Classifies one (date, slot) pair against the record snapshot.
///
/// Records match on exact string equality of `date` and `slot_id`; nothing is
/// trimmed or case-folded. A non-empty `viewer_staff_id` enables the `Mine`
/// status.
pub fn evaluate_slot(
    catalog: &ScheduleCatalog,
    date: NaiveDate,
    slot_id: &str,
    records: &[ShiftRecord],
    viewer_staff_id: Option<&str>,
) -> SlotEvaluation {
    let required = catalog.required_staff(slot_id) as usize;

    if !catalog.is_slot_available(date, slot_id) {
        return SlotEvaluation {
            date,
            slot_id: slot_id.to_string(),
            is_operating: false,
            count: 0,
            required,
            status: SlotStatus::Closed,
            status_label: SlotStatus::Closed.label(),
            assigned_staff: Vec::new(),
        };
    }

    let day = date_key(date);
    let assigned: Vec<&ShiftRecord> = records
        .iter()
        .filter(|record| record.date == day && record.slot_id == slot_id)
        .collect();

    let viewer_assigned = match viewer_staff_id {
        Some(viewer) if !viewer.is_empty() => {
            assigned.iter().any(|record| record.staff_id == viewer)
        }
        _ => false,
    };

    let facts = SlotFacts {
        count: assigned.len(),
        required,
        viewer_assigned,
    };
    let status = classify(&facts);

    SlotEvaluation {
        date,
        slot_id: slot_id.to_string(),
        is_operating: true,
        count: facts.count,
        required,
        status,
        status_label: status.label(),
        assigned_staff: assigned
            .into_iter()
            .map(ShiftRecord::assigned_staff)
            .collect(),
    }
}

/// Evaluates every catalog slot for `date`, closed slots included.
pub fn evaluate_day(
    catalog: &ScheduleCatalog,
    date: NaiveDate,
    records: &[ShiftRecord],
    viewer_staff_id: Option<&str>,
) -> Vec<SlotEvaluation> {
    catalog
        .slots
        .iter()
        .map(|slot| evaluate_slot(catalog, date, &slot.id, records, viewer_staff_id))
        .collect()
}

use super::catalog::ScheduleCatalog;
use super::domain::ShiftRecord;
use super::evaluator::evaluate_slot;
use serde::Serialize;

/// Staffing totals across the whole operation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodStats {
    pub total_slots: usize,
    pub filled_slots: usize,
    pub shortage_slots: usize,
    /// `None` when no viewer is selected.
    pub my_slots: Option<usize>,
}

impl PeriodStats {
    pub fn fill_rate(&self) -> f32 {
        if self.total_slots == 0 {
            return 0.0;
        }
        self.filled_slots as f32 / self.total_slots as f32
    }
}

pub fn aggregate(
    catalog: &ScheduleCatalog,
    records: &[ShiftRecord],
    viewer_staff_id: Option<&str>,
) -> PeriodStats {
    let mut stats = PeriodStats::default();

    for date in catalog.operating_dates() {
        for slot in catalog.available_slots(date) {
            let evaluation = evaluate_slot(catalog, date, &slot.id, records, None);
            stats.total_slots += 1;
            if evaluation.is_staffed() {
                stats.filled_slots += 1;
            } else {
                stats.shortage_slots += 1;
            }
        }
    }

    stats.my_slots = viewer_staff_id
        .filter(|viewer| !viewer.is_empty())
        .map(|viewer| my_slot_count(records, viewer));

    stats
}

/// Every record carrying the staff id counts, including dates outside the
/// period and slots missing from the catalog.
pub fn my_slot_count(records: &[ShiftRecord], staff_id: &str) -> usize {
    records
        .iter()
        .filter(|record| record.staff_id == staff_id)
        .count()
}

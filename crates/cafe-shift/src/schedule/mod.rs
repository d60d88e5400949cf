mod aggregate;
mod calendar;
pub mod catalog;
pub mod domain;
mod evaluator;
mod normalizer;

pub use aggregate::{aggregate, my_slot_count, PeriodStats};
pub use calendar::{
    calendar_grid, day_detail, staff_options, CalendarDay, CalendarGrid, CalendarWeek, DayDetail,
    DaySlotDetail, StaffOption, StaffingNote,
};
pub use catalog::{CatalogError, ScheduleCatalog, SlotDefinition};
pub use domain::{RawShiftRecord, ShiftRecord, SlotStatus};
pub use evaluator::{evaluate_day, evaluate_slot, SlotEvaluation};
pub use normalizer::{normalize, normalize_all};

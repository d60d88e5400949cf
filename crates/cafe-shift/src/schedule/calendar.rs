use super::catalog::ScheduleCatalog;
use super::domain::{ShiftRecord, SlotStatus, StaffRole};
use super::evaluator::{evaluate_day, evaluate_slot, SlotEvaluation};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub weekday: Weekday,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_operating: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotEvaluation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarWeek {
    pub days: Vec<CalendarDay>,
}

/// Sunday-first month-style grid covering the whole operation period.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub weeks: Vec<CalendarWeek>,
}

impl CalendarGrid {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flat_map(|week| week.days.iter())
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days().find(|day| day.date == date)
    }
}

pub fn calendar_grid(
    catalog: &ScheduleCatalog,
    records: &[ShiftRecord],
    viewer_staff_id: Option<&str>,
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> CalendarGrid {
    let period = catalog.period;
    let first = period.start
        - Duration::days(i64::from(period.start.weekday().num_days_from_sunday()));
    let last =
        period.end + Duration::days(i64::from(6 - period.end.weekday().num_days_from_sunday()));

    let days: Vec<CalendarDay> = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let is_operating = catalog.is_operating_day(date);
            let slots = if is_operating {
                evaluate_day(catalog, date, records, viewer_staff_id)
            } else {
                Vec::new()
            };

            CalendarDay {
                date,
                day_of_month: date.day(),
                weekday: date.weekday(),
                is_today: date == today,
                is_selected: selected == Some(date),
                is_operating,
                slots,
            }
        })
        .collect();

    let weeks = days
        .chunks(7)
        .map(|chunk| CalendarWeek {
            days: chunk.to_vec(),
        })
        .collect();

    CalendarGrid {
        period_start: period.start,
        period_end: period.end,
        weeks,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StaffingNote {
    NotOperating,
    NoApplicants { needed: usize },
    MoreNeeded { remaining: usize },
    RequirementMet,
}

impl StaffingNote {
    fn for_evaluation(evaluation: &SlotEvaluation) -> Self {
        if !evaluation.is_operating {
            Self::NotOperating
        } else if evaluation.count == 0 {
            Self::NoApplicants {
                needed: evaluation.required,
            }
        } else if evaluation.count < evaluation.required {
            Self::MoreNeeded {
                remaining: evaluation.remaining(),
            }
        } else {
            Self::RequirementMet
        }
    }

    pub fn describe(&self, slot_label: &str) -> String {
        match self {
            Self::NotOperating => format!("{slot_label} is not operating on this day"),
            Self::NoApplicants { needed } => format!("no applicants ({needed} needed)"),
            Self::MoreNeeded { remaining } => format!("{remaining} more needed"),
            Self::RequirementMet => "requirement met".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySlotDetail {
    pub slot_id: String,
    pub label: String,
    pub start: String,
    pub end: String,
    pub evaluation: SlotEvaluation,
    pub note: StaffingNote,
    pub note_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub slots: Vec<DaySlotDetail>,
}

/// Per-slot breakdown of one date. Viewer highlighting does not apply here, so
/// statuses stay within closed / full / available / shortage.
pub fn day_detail(catalog: &ScheduleCatalog, records: &[ShiftRecord], date: NaiveDate) -> DayDetail {
    let slots = catalog
        .slots
        .iter()
        .map(|slot| {
            let evaluation = evaluate_slot(catalog, date, &slot.id, records, None);
            debug_assert_ne!(evaluation.status, SlotStatus::Mine);
            let note = StaffingNote::for_evaluation(&evaluation);
            DaySlotDetail {
                slot_id: slot.id.clone(),
                label: slot.label.clone(),
                start: slot.start.format("%H:%M").to_string(),
                end: slot.end.format("%H:%M").to_string(),
                note_text: note.describe(&slot.label),
                evaluation,
                note,
            }
        })
        .collect();

    DayDetail {
        date,
        weekday: date.weekday(),
        slots,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffOption {
    pub id: String,
    pub label: String,
}

/// Viewer picker entries: "All staff" first, then the roster in order.
pub fn staff_options(catalog: &ScheduleCatalog) -> Vec<StaffOption> {
    let mut options = vec![StaffOption {
        id: String::new(),
        label: "All staff".to_string(),
    }];

    options.extend(catalog.roster.iter().map(|member| {
        let suffix = match member.role {
            StaffRole::Leader => format!(" ({})", StaffRole::Leader.label()),
            StaffRole::Staff => String::new(),
        };
        StaffOption {
            id: member.id.clone(),
            label: format!("{}{} ({})", member.name, suffix, member.id),
        }
    }));

    options
}

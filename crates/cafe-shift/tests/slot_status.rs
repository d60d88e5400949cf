use cafe_shift::schedule::catalog::{DateOverride, OperationPeriod, WeekdaySlots};
use cafe_shift::schedule::domain::{StaffMember, StaffRole};
use cafe_shift::schedule::{
    aggregate, calendar_grid, day_detail, evaluate_slot, normalize, staff_options,
    RawShiftRecord, ScheduleCatalog, ShiftRecord, SlotDefinition, SlotStatus, StaffingNote,
};
use chrono::{NaiveDate, NaiveTime, Weekday};
use serde_json::json;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date")
}

fn slot(id: &str, required_staff: u32) -> SlotDefinition {
    SlotDefinition {
        id: id.to_string(),
        label: id.to_string(),
        start: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
        end: NaiveTime::from_hms_opt(13, 0, 0).expect("valid time"),
        required_staff,
    }
}

/// One week (Sat 2024-06-01 .. Fri 2024-06-07). Morning runs every day,
/// evening only on weekdays, Monday is closed.
fn catalog() -> ScheduleCatalog {
    let every_day = |weekday, slots: &[&str]| WeekdaySlots {
        weekday,
        slots: slots.iter().map(|id| id.to_string()).collect(),
    };

    ScheduleCatalog {
        roster: vec![
            StaffMember {
                id: "A".to_string(),
                name: "Aiko".to_string(),
                role: StaffRole::Leader,
            },
            StaffMember {
                id: "B".to_string(),
                name: "Ben".to_string(),
                role: StaffRole::Staff,
            },
        ],
        slots: vec![slot("morning", 2), slot("evening", 1), slot("tasting", 0)],
        period: OperationPeriod {
            start: date(1),
            end: date(7),
        },
        weekly_slots: vec![
            every_day(Weekday::Sat, &["morning"]),
            every_day(Weekday::Sun, &["morning"]),
            every_day(Weekday::Tue, &["morning", "evening"]),
            every_day(Weekday::Wed, &["morning", "evening"]),
            every_day(Weekday::Thu, &["morning", "evening"]),
            every_day(Weekday::Fri, &["morning", "evening", "tasting"]),
        ],
        date_overrides: vec![DateOverride {
            date: date(5),
            slots: vec!["morning".to_string()],
        }],
        default_required_staff: 1,
    }
}

fn record(day: &str, slot_id: &str, staff_id: &str) -> ShiftRecord {
    ShiftRecord {
        date: day.to_string(),
        staff_id: staff_id.to_string(),
        staff_name: format!("Staff {staff_id}"),
        slot_id: slot_id.to_string(),
    }
}

#[test]
fn single_assignment_is_available() {
    let records = vec![record("2024-06-01", "morning", "A")];
    let evaluation = evaluate_slot(&catalog(), date(1), "morning", &records, None);

    assert!(evaluation.is_operating);
    assert_eq!(evaluation.count, 1);
    assert_eq!(evaluation.required, 2);
    assert_eq!(evaluation.status, SlotStatus::Available);
    assert_eq!(evaluation.assigned_staff.len(), 1);
    assert_eq!(evaluation.assigned_staff[0].staff_id, "A");
}

#[test]
fn second_assignment_fills_the_slot() {
    let records = vec![
        record("2024-06-01", "morning", "A"),
        record("2024-06-01", "morning", "B"),
    ];
    let evaluation = evaluate_slot(&catalog(), date(1), "morning", &records, None);

    assert_eq!(evaluation.count, 2);
    assert_eq!(evaluation.status, SlotStatus::Full);
}

#[test]
fn viewer_assignment_is_mine_even_when_short_or_full() {
    let catalog = catalog();
    let short = vec![record("2024-06-01", "morning", "A")];
    let evaluation = evaluate_slot(&catalog, date(1), "morning", &short, Some("A"));
    assert_eq!(evaluation.status, SlotStatus::Mine);
    assert_eq!(evaluation.count, 1);

    let full = vec![
        record("2024-06-01", "morning", "A"),
        record("2024-06-01", "morning", "B"),
        record("2024-06-01", "morning", "C"),
    ];
    let evaluation = evaluate_slot(&catalog, date(1), "morning", &full, Some("A"));
    assert_eq!(evaluation.status, SlotStatus::Mine);
    assert_eq!(evaluation.count, 3);
}

#[test]
fn empty_or_absent_viewer_never_matches() {
    let records = vec![record("2024-06-01", "morning", "")];
    let evaluation = evaluate_slot(&catalog(), date(1), "morning", &records, Some(""));
    assert_eq!(evaluation.status, SlotStatus::Available);

    let evaluation = evaluate_slot(&catalog(), date(1), "morning", &records, Some("B"));
    assert_eq!(evaluation.status, SlotStatus::Available);
}

#[test]
fn unstaffed_open_slot_is_shortage() {
    let evaluation = evaluate_slot(&catalog(), date(4), "evening", &[], None);
    assert!(evaluation.is_operating);
    assert_eq!(evaluation.status, SlotStatus::Shortage);
    assert_eq!(evaluation.required, 1);
}

#[test]
fn closed_slots_ignore_records() {
    let catalog = catalog();
    // Monday, a weekday-closed evening on Saturday, an override-closed evening,
    // a date outside the period, and a slot missing from the catalog.
    let cases = [
        (date(3), "morning"),
        (date(1), "evening"),
        (date(5), "evening"),
        (date(8), "morning"),
        (date(4), "brunch"),
    ];

    for (day, slot_id) in cases {
        let key = day.format("%Y-%m-%d").to_string();
        let records = vec![record(&key, slot_id, "A"), record(&key, slot_id, "B")];
        let evaluation = evaluate_slot(&catalog, day, slot_id, &records, Some("A"));
        assert!(!evaluation.is_operating, "{key} {slot_id} should be closed");
        assert_eq!(evaluation.status, SlotStatus::Closed);
        assert_eq!(evaluation.count, 0);
        assert!(evaluation.assigned_staff.is_empty());
    }

    let evaluation = evaluate_slot(&catalog, date(3), "morning", &[], None);
    assert_eq!(evaluation.required, 2, "required is still reported when closed");
}

#[test]
fn matching_is_exact_string_equality() {
    let records = vec![
        record("2024-06-01", "Morning", "A"),
        record("2024-06-01", " morning", "A"),
        record("2024-06-1", "morning", "A"),
        record("2024-06-01T09:00:00Z", "morning", "A"),
        record("2024-06-01", "morning", "B"),
    ];
    let evaluation = evaluate_slot(&catalog(), date(1), "morning", &records, None);

    assert_eq!(evaluation.count, 1);
    assert_eq!(evaluation.count, evaluation.assigned_staff.len());
    assert_eq!(evaluation.assigned_staff[0].staff_id, "B");
}

#[test]
fn zero_required_slot_is_full_without_staff() {
    let evaluation = evaluate_slot(&catalog(), date(7), "tasting", &[], None);
    assert!(evaluation.is_operating);
    assert_eq!(evaluation.required, 0);
    assert_eq!(evaluation.status, SlotStatus::Full);
}

#[test]
fn normalized_raw_records_feed_the_evaluator() {
    let raw: RawShiftRecord = serde_json::from_value(json!({
        "date": "2024-06-01T09:00:00Z",
        "staffId": 7,
        "slotId": "morning",
        "staffName": "Hana"
    }))
    .expect("raw record");
    let records = vec![normalize(&raw)];

    let evaluation = evaluate_slot(&catalog(), date(1), "morning", &records, Some("7"));
    assert_eq!(evaluation.status, SlotStatus::Mine);
    assert_eq!(evaluation.assigned_staff[0].staff_name, "Hana");
}

#[test]
fn aggregate_counts_only_operating_slots() {
    let catalog = catalog();
    let records = vec![
        record("2024-06-01", "morning", "A"),
        record("2024-06-01", "morning", "B"),
        record("2024-06-04", "evening", "A"),
        record("2024-06-04", "morning", "A"),
        // Off-catalog and out-of-period records only count toward "my slots".
        record("2024-06-03", "morning", "A"),
        record("2024-07-01", "brunch", "A"),
    ];

    let stats = aggregate(&catalog, &records, Some("A"));
    // Sat 1, Sun 2 morning; Tue 4, Thu 6 morning+evening; Wed 5 morning (override);
    // Fri 7 morning+evening+tasting.
    assert_eq!(stats.total_slots, 10);
    // Filled: Sat morning, Tue evening, Fri tasting (required 0).
    assert_eq!(stats.filled_slots, 3);
    assert_eq!(stats.shortage_slots, 7);
    assert_eq!(stats.filled_slots + stats.shortage_slots, stats.total_slots);
    assert_eq!(stats.my_slots, Some(5));

    let anonymous = aggregate(&catalog, &records, None);
    assert_eq!(anonymous.my_slots, None);
    assert_eq!(anonymous.total_slots, stats.total_slots);
}

#[test]
fn grid_spans_whole_weeks() {
    let catalog = catalog();
    let records = vec![record("2024-06-04", "morning", "A")];
    let grid = calendar_grid(&catalog, &records, Some("A"), date(4), Some(date(6)));

    // Sat 2024-06-01 starts the period, so the grid opens on Sun 2024-05-26 and
    // closes on Sat 2024-06-08.
    assert_eq!(grid.weeks.len(), 2);
    assert!(grid.weeks.iter().all(|week| week.days.len() == 7));
    let first = grid.days().next().expect("first day");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 5, 26).unwrap());
    assert!(!first.is_operating);
    assert!(first.slots.is_empty());
    assert_eq!(grid.days().last().expect("last day").date, date(8));

    let tuesday = grid.day(date(4)).expect("tuesday present");
    assert!(tuesday.is_today);
    assert!(tuesday.is_operating);
    assert_eq!(tuesday.slots.len(), catalog.slots.len());
    assert_eq!(tuesday.slots[0].status, SlotStatus::Mine);
    assert_eq!(tuesday.slots[2].status, SlotStatus::Closed);

    assert!(grid.day(date(6)).expect("thursday").is_selected);
    assert!(!grid.day(date(3)).expect("monday").is_operating);
}

#[test]
fn day_detail_notes_staffing_gaps() {
    let records = vec![
        record("2024-06-04", "morning", "A"),
        record("2024-06-04", "evening", "A"),
        record("2024-06-04", "evening", "B"),
    ];
    let detail = day_detail(&catalog(), &records, date(4));

    assert_eq!(detail.weekday, Weekday::Tue);
    let notes: Vec<_> = detail.slots.iter().map(|slot| slot.note).collect();
    assert_eq!(
        notes,
        vec![
            StaffingNote::MoreNeeded { remaining: 1 },
            StaffingNote::RequirementMet,
            StaffingNote::NotOperating,
        ]
    );
    assert_eq!(detail.slots[0].note_text, "1 more needed");
    assert_eq!(detail.slots[0].start, "10:00");

    let empty = day_detail(&catalog(), &[], date(4));
    assert_eq!(empty.slots[0].note, StaffingNote::NoApplicants { needed: 2 });
    assert_eq!(empty.slots[0].note_text, "no applicants (2 needed)");
}

#[test]
fn staff_options_mark_leaders() {
    let options = staff_options(&catalog());
    assert_eq!(options.len(), 3);
    assert_eq!(options[0].id, "");
    assert_eq!(options[1].label, "Aiko (Leader) (A)");
    assert_eq!(options[2].label, "Ben (B)");
}

use crate::infra::{file_context, parse_date, CalendarContext};
use cafe_shift::config::AppConfig;
use cafe_shift::error::AppError;
use cafe_shift::schedule::{
    aggregate, calendar_grid, day_detail, staff_options, CalendarGrid, DayDetail, PeriodStats,
    ScheduleCatalog, SlotStatus,
};
use cafe_shift::sync::{import_csv_path, JsonFileStore, ShiftSnapshot, SnapshotSource};
use cafe_shift::telemetry;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct CalendarArgs {
    /// Highlight this staff member's shifts (defaults to the last selection)
    #[arg(long)]
    pub(crate) staff_id: Option<String>,
    /// Override today's date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Mark a selected day in the grid (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) selected: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct DayArgs {
    /// Day to break down (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: NaiveDate,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    /// Count this staff member's shifts (defaults to the last selection)
    #[arg(long)]
    pub(crate) staff_id: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV export of the shift sheet with date, staffId, staffName, slotId columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) async fn run_calendar(args: CalendarArgs) -> Result<(), AppError> {
    let context = open_workspace()?;
    let snapshot = context.loader.load().await?;
    let viewer = context.resolve_viewer(args.staff_id)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let grid = calendar_grid(
        &context.catalog,
        &snapshot.records,
        viewer.as_deref(),
        today,
        args.selected,
    );
    let stats = aggregate(&context.catalog, &snapshot.records, viewer.as_deref());

    render_source(&snapshot);
    if let Some(viewer) = &viewer {
        println!("Viewing as {}", viewer_label(&context.catalog, viewer));
    }
    render_calendar(&context.catalog, &grid);
    render_stats(&stats);
    Ok(())
}

pub(crate) async fn run_day(args: DayArgs) -> Result<(), AppError> {
    let context = open_workspace()?;
    let snapshot = context.loader.load().await?;

    render_day(&day_detail(&context.catalog, &snapshot.records, args.date));
    Ok(())
}

pub(crate) async fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let context = open_workspace()?;
    let snapshot = context.loader.load().await?;
    let viewer = context.resolve_viewer(args.staff_id)?;

    render_source(&snapshot);
    render_stats(&aggregate(
        &context.catalog,
        &snapshot.records,
        viewer.as_deref(),
    ));
    Ok(())
}

pub(crate) fn run_staff() -> Result<(), AppError> {
    let context = open_workspace()?;

    for option in staff_options(&context.catalog) {
        if option.id.is_empty() {
            println!("  (blank)  {}", option.label);
        } else {
            println!("  {:<8} {}", option.id, option.label);
        }
    }
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let context = open_workspace()?;
    let imported = import_csv_path(&**context.loader.store(), &args.csv)?;
    println!(
        "Imported {} shift records from {} into {}",
        imported,
        args.csv.display(),
        context.loader.store().path().display()
    );
    Ok(())
}

fn open_workspace() -> Result<CalendarContext<JsonFileStore>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    file_context(&config)
}

fn viewer_label(catalog: &ScheduleCatalog, staff_id: &str) -> String {
    match catalog.staff(staff_id) {
        Some(member) => format!("{} ({})", member.name, member.id),
        None => staff_id.to_string(),
    }
}

fn render_source(snapshot: &ShiftSnapshot) {
    let source = match snapshot.source {
        SnapshotSource::Remote => "spreadsheet API",
        SnapshotSource::Cache => "local cache",
    };
    println!(
        "Data source: {} ({} records, loaded {})",
        source,
        snapshot.len(),
        snapshot.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

pub(crate) fn render_calendar(catalog: &ScheduleCatalog, grid: &CalendarGrid) {
    println!(
        "\nShift calendar {} -> {}",
        grid.period_start, grid.period_end
    );
    println!(
        "Legend: {} mine  {} full  {} available  {} shortage  {} closed",
        SlotStatus::Mine.marker(),
        SlotStatus::Full.marker(),
        SlotStatus::Available.marker(),
        SlotStatus::Shortage.marker(),
        SlotStatus::Closed.marker()
    );

    for week in &grid.weeks {
        println!();
        for day in &week.days {
            let mut flags = String::new();
            if day.is_today {
                flags.push_str(" today");
            }
            if day.is_selected {
                flags.push_str(" selected");
            }

            if !day.is_operating {
                println!("{} {}  closed{}", day.date, day.weekday, flags);
                continue;
            }

            let slots: Vec<String> = day
                .slots
                .iter()
                .map(|evaluation| {
                    let label = catalog
                        .slot(&evaluation.slot_id)
                        .map(|slot| slot.label.as_str())
                        .unwrap_or(evaluation.slot_id.as_str());
                    if evaluation.is_operating {
                        format!(
                            "{}{} {}/{}",
                            evaluation.status.marker(),
                            label,
                            evaluation.count,
                            evaluation.required
                        )
                    } else {
                        format!("{}{}", evaluation.status.marker(), label)
                    }
                })
                .collect();
            println!("{} {}  {}{}", day.date, day.weekday, slots.join("  "), flags);
        }
    }
}

pub(crate) fn render_stats(stats: &PeriodStats) {
    println!("\nPeriod totals");
    println!("- Operating slots: {}", stats.total_slots);
    println!(
        "- Staffed: {} ({:.0}%)",
        stats.filled_slots,
        stats.fill_rate() * 100.0
    );
    println!("- Short: {}", stats.shortage_slots);
    match stats.my_slots {
        Some(count) => println!("- My shifts: {}", count),
        None => println!("- My shifts: -"),
    }
}

pub(crate) fn render_day(detail: &DayDetail) {
    println!("Shifts for {} ({})", detail.date, detail.weekday);
    for slot in &detail.slots {
        let evaluation = &slot.evaluation;
        let headcount = if evaluation.is_operating {
            format!("{}/{}", evaluation.count, evaluation.required)
        } else {
            "not operating".to_string()
        };
        println!(
            "\n{} ({}-{})  [{}] {}",
            slot.label, slot.start, slot.end, evaluation.status_label, headcount
        );
        for staff in &evaluation.assigned_staff {
            println!("  - {} ({})", staff.staff_name, staff.staff_id);
        }
        println!("  {}", slot.note_text);
    }
}

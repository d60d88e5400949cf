use crate::console::{
    run_calendar, run_day, run_import, run_stats, run_staff, CalendarArgs, DayArgs, ImportArgs,
    StatsArgs,
};
use crate::server;
use cafe_shift::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Café Shift Calendar",
    about = "Serve and inspect the café staff shift calendar",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the shift calendar with per-slot staffing status
    Calendar(CalendarArgs),
    /// Break down a single day slot by slot
    Day(DayArgs),
    /// Print period staffing totals
    Stats(StatsArgs),
    /// List roster entries available as viewers
    Staff,
    /// Replace the local shift cache with a CSV export of the shift sheet
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calendar(args) => run_calendar(args).await,
        Command::Day(args) => run_day(args).await,
        Command::Stats(args) => run_stats(args).await,
        Command::Staff => run_staff(),
        Command::Import(args) => run_import(args),
    }
}

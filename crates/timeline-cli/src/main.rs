//! `timeline` — inspect lane assignments and calendar pages from the shell.
//!
//! ```text
//! timeline page --mode month --index -1 --base 2024-01-15
//! timeline lanes --events events.json --strategy indexed
//! timeline grid --events events.json --mode week --timezone Europe/Berlin
//! ```
//!
//! All output is JSON on stdout. Set `RUST_LOG=debug` for engine logs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use timeline_engine::{
    assign_lanes_with, build_grid, calendar_page, parse_events_json, prepare_events,
    DegeneratePolicy, LaneStrategy, LanedEvent, PageGrid, TimelineCalendar, ViewMode, WeekStartDay,
};

#[derive(Parser, Debug)]
#[command(
    name = "timeline",
    version,
    about = "Timeline lane assignment and calendar paging"
)]
struct Cli {
    #[command(flatten)]
    calendar: CalendarArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign events to non-overlapping lanes
    Lanes {
        /// JSON array of {id, name, start, end}
        #[arg(long)]
        events: PathBuf,

        #[command(flatten)]
        lanes: LaneArgs,
    },
    /// Print the dates and label of one calendar page
    Page {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Lay out one page against the lane assignment of an event file
    Grid {
        /// JSON array of {id, name, start, end}
        #[arg(long)]
        events: PathBuf,

        #[command(flatten)]
        lanes: LaneArgs,

        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Args, Debug)]
struct CalendarArgs {
    /// Calendar config JSON: {"timezone": "...", "week_start": "monday|sunday"}
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// IANA timezone whose midnights delimit days (overrides --config)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// First day of the week (overrides --config)
    #[arg(long, global = true, value_enum)]
    week_start: Option<WeekStartArg>,
}

#[derive(Args, Debug)]
struct LaneArgs {
    #[arg(long, value_enum, default_value_t = StrategyArg::Linear)]
    strategy: StrategyArg,

    /// What to do with events that end before they start
    #[arg(long, value_enum, default_value_t = DegenerateArg::Reject)]
    on_degenerate: DegenerateArg,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, value_enum, default_value_t = ModeArg::Week)]
    mode: ModeArg,

    /// Pages away from the page containing the base date
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    index: i64,

    /// Base date (RFC 3339 or YYYY-MM-DD); defaults to today
    #[arg(long)]
    base: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WeekStartArg {
    Monday,
    Sunday,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Linear,
    Indexed,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DegenerateArg {
    Reject,
    Swap,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Week,
    Month,
    Year,
}

impl From<WeekStartArg> for WeekStartDay {
    fn from(arg: WeekStartArg) -> Self {
        match arg {
            WeekStartArg::Monday => WeekStartDay::Monday,
            WeekStartArg::Sunday => WeekStartDay::Sunday,
        }
    }
}

impl From<StrategyArg> for LaneStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Linear => LaneStrategy::Linear,
            StrategyArg::Indexed => LaneStrategy::Indexed,
        }
    }
}

impl From<DegenerateArg> for DegeneratePolicy {
    fn from(arg: DegenerateArg) -> Self {
        match arg {
            DegenerateArg::Reject => DegeneratePolicy::Reject,
            DegenerateArg::Swap => DegeneratePolicy::Swap,
        }
    }
}

impl From<ModeArg> for ViewMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Week => ViewMode::Week,
            ModeArg::Month => ViewMode::Month,
            ModeArg::Year => ViewMode::Year,
        }
    }
}

/// Grid output carries the laned events its cells index into.
#[derive(Serialize)]
struct GridOutput<'a> {
    grid: &'a PageGrid,
    events: &'a [LanedEvent],
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let calendar = resolve_calendar(&cli.calendar)?;
    log::debug!("using calendar {:?}", calendar);

    match cli.command {
        Command::Lanes { events, lanes } => {
            let laned = load_lanes(&events, &lanes, &calendar)?;
            print_json(&laned)
        }
        Command::Page { page } => {
            let base = resolve_base(page.base.as_deref(), &calendar)?;
            let page = calendar_page(base, page.index, page.mode.into(), &calendar)
                .context("failed to build calendar page")?;
            print_json(&page)
        }
        Command::Grid {
            events,
            lanes,
            page,
        } => {
            let laned = load_lanes(&events, &lanes, &calendar)?;
            let base = resolve_base(page.base.as_deref(), &calendar)?;
            let page = calendar_page(base, page.index, page.mode.into(), &calendar)
                .context("failed to build calendar page")?;
            let grid = build_grid(page, &laned, &calendar);
            print_json(&GridOutput {
                grid: &grid,
                events: &laned,
            })
        }
    }
}

fn resolve_calendar(args: &CalendarArgs) -> Result<TimelineCalendar> {
    let mut calendar = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            TimelineCalendar::from_json(&json)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => TimelineCalendar::default(),
    };

    let week_start = args
        .week_start
        .map(WeekStartDay::from)
        .unwrap_or(calendar.week_start());
    if let Some(name) = &args.timezone {
        calendar = TimelineCalendar::with_timezone_name(name, week_start)?;
    } else {
        calendar = TimelineCalendar::new(calendar.timezone(), week_start);
    }
    Ok(calendar)
}

fn resolve_base(base: Option<&str>, calendar: &TimelineCalendar) -> Result<DateTime<Utc>> {
    match base {
        Some(text) => calendar
            .parse_instant(text)
            .context("failed to parse --base"),
        None => Ok(calendar.today(Utc::now())),
    }
}

fn load_lanes(
    path: &Path,
    args: &LaneArgs,
    calendar: &TimelineCalendar,
) -> Result<Vec<LanedEvent>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read events {}", path.display()))?;
    let events = parse_events_json(&json, calendar)
        .with_context(|| format!("failed to parse events {}", path.display()))?;
    let events = prepare_events(events, args.on_degenerate.into())?;
    Ok(assign_lanes_with(&events, calendar, args.strategy.into()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

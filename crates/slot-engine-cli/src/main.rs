//! `slots` CLI: validate mentor schedules, list bookable slots and price sessions.
//!
//! ## Usage
//!
//! ```sh
//! # Validate a schedule draft (every error is printed)
//! slots validate -i schedule.json
//!
//! # Bookable slots on a mentor-local date, shown in the viewer's timezone
//! slots slots -i schedule.json --date 2026-03-16 --viewer-tz Europe/Berlin
//!
//! # Exclude existing bookings and use 30-minute slots
//! slots slots -i schedule.json --date 2026-03-16 --viewer-tz UTC \
//!     --bookings bookings.json --duration 30
//!
//! # The next 7 days of slots from a point in time
//! slots upcoming -i schedule.json --from 2026-03-16T06:30:00Z --days 7 --viewer-tz UTC
//!
//! # Price a session for a private individual
//! slots price --price 1000 --status private-individual
//! ```
//!
//! Set `RUST_LOG=slot_engine=debug` (or pass `--verbose`) for generation logs on stderr.

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use slot_engine::{
    price_offer, validate, Booking, DayBookings, DstPolicy, FeeTable, LegalStatus, MentorId,
    ScheduleDraft, SlotGenerator, WeeklyAvailability,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Mentor availability, bookable slots and session pricing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log generation and validation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schedule draft and report every error
    Validate {
        /// Schedule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List bookable slots for one mentor-local date
    Slots {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// Mentor-local calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// List bookable slots for consecutive days starting at an instant
    Upcoming {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// Earliest slot start (RFC 3339)
        #[arg(long)]
        from: DateTime<Utc>,
        /// Number of mentor-local days to cover
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Compute platform fee, tax and total for a session price
    Price {
        /// Mentor's session price in whole currency units
        #[arg(long, allow_negative_numbers = true)]
        price: i64,
        /// Mentor's declared legal status
        #[arg(long, value_enum)]
        status: StatusArg,
        /// JSON file overriding the built-in fee profiles
        #[arg(long)]
        fee_table: Option<String>,
    },
}

#[derive(clap::Args)]
struct ScheduleArgs {
    /// Schedule JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// IANA timezone the slots are displayed in
    #[arg(long, default_value = "UTC")]
    viewer_tz: String,
    /// Slot length in minutes
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    duration: i64,
    /// JSON array of existing bookings: [{"start": "...", "duration_minutes": 60}]
    #[arg(long)]
    bookings: Option<String>,
    /// What to do with slot starts that fall in a DST gap
    #[arg(long, value_enum, default_value_t = DstPolicyArg::Skip)]
    dst_policy: DstPolicyArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    IndividualEntrepreneur,
    PrivateIndividual,
}

impl From<StatusArg> for LegalStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::IndividualEntrepreneur => LegalStatus::IndividualEntrepreneur,
            StatusArg::PrivateIndividual => LegalStatus::PrivateIndividual,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DstPolicyArg {
    Skip,
    ShiftForward,
}

impl From<DstPolicyArg> for DstPolicy {
    fn from(arg: DstPolicyArg) -> Self {
        match arg {
            DstPolicyArg::Skip => DstPolicy::Skip,
            DstPolicyArg::ShiftForward => DstPolicy::ShiftForward,
        }
    }
}

/// Booking as listed in a `--bookings` file. The mentor is implied.
#[derive(Deserialize)]
struct BookingInput {
    start: DateTime<Utc>,
    duration_minutes: u32,
}

#[derive(Serialize)]
struct PriceOutput {
    status: LegalStatus,
    #[serde(flatten)]
    breakdown: slot_engine::PriceBreakdown,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate { input } => {
            let draft = read_draft(input.as_deref())?;
            match validate(&draft) {
                Ok(schedule) => {
                    println!(
                        "OK: {} interval(s) in {}",
                        draft.interval_count(),
                        schedule.timezone().name()
                    );
                }
                Err(errors) => {
                    for err in errors.iter() {
                        println!("{}", err);
                    }
                    anyhow::bail!("schedule has {} error(s)", errors.len());
                }
            }
        }
        Commands::Slots { schedule, date } => {
            let ctx = SlotContext::load(&schedule)?;
            let day = ctx.day_bookings(date);
            let slots = ctx.generator.generate(&ctx.availability, date, ctx.viewer_tz, &day);
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        Commands::Upcoming {
            schedule,
            from,
            days,
        } => {
            let ctx = SlotContext::load(&schedule)?;
            let upcoming = ctx.generator.generate_upcoming(
                &ctx.availability,
                from,
                days,
                ctx.viewer_tz,
                &ctx.bookings,
            );
            println!("{}", serde_json::to_string_pretty(&upcoming)?);
        }
        Commands::Price {
            price,
            status,
            fee_table,
        } => {
            let table = match fee_table {
                Some(path) => {
                    debug!(path = %path, "loading fee table");
                    FeeTable::from_json(&read_input(Some(path.as_str()))?)
                        .with_context(|| format!("Failed to parse fee table: {}", path))?
                }
                None => FeeTable::default(),
            };
            let status = LegalStatus::from(status);
            let breakdown = price_offer(price, status, &table).context("Failed to price session")?;
            let output = PriceOutput { status, breakdown };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Everything the slot subcommands need, loaded and checked up front.
struct SlotContext {
    availability: WeeklyAvailability,
    generator: SlotGenerator,
    viewer_tz: Tz,
    mentor: MentorId,
    bookings: Vec<Booking>,
}

impl SlotContext {
    fn load(args: &ScheduleArgs) -> Result<Self> {
        let draft = read_draft(args.input.as_deref())?;
        let availability = validate(&draft).context("Schedule is not valid")?;
        let generator = SlotGenerator::new(args.duration)
            .context("Invalid --duration")?
            .with_dst_policy(args.dst_policy.into());
        let viewer_tz = parse_timezone(&args.viewer_tz)?;
        let mentor = MentorId::new("cli");
        let bookings = match args.bookings.as_deref() {
            Some(path) => read_bookings(path, &mentor)?,
            None => Vec::new(),
        };
        info!(
            mentor_tz = availability.timezone().name(),
            viewer_tz = viewer_tz.name(),
            duration = generator.duration_minutes(),
            bookings = bookings.len(),
            "schedule loaded"
        );
        Ok(Self {
            availability,
            generator,
            viewer_tz,
            mentor,
            bookings,
        })
    }

    fn day_bookings(&self, date: NaiveDate) -> DayBookings {
        DayBookings::collect(
            &self.bookings,
            &self.mentor,
            date,
            self.availability.timezone(),
        )
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| anyhow::anyhow!("Unknown timezone: '{}'", name))
}

fn read_draft(path: Option<&str>) -> Result<ScheduleDraft> {
    let json = read_input(path)?;
    ScheduleDraft::from_json(&json).context("Failed to parse schedule JSON")
}

fn read_bookings(path: &str, mentor: &MentorId) -> Result<Vec<Booking>> {
    let json = read_input(Some(path))?;
    let inputs: Vec<BookingInput> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse bookings file: {}", path))?;
    inputs
        .into_iter()
        .map(|b| {
            Booking::new(mentor.clone(), b.start, b.duration_minutes)
                .with_context(|| format!("Invalid booking at {}", b.start))
        })
        .collect()
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

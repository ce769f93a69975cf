mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use appointment_core::time::{format_storage, parse_storage, parse_timezone};
use appointment_core::{
    format_for_display, normalize_for_storage, validate_appointment, Appointment, AppointmentId,
    AppointmentInterval, InMemoryStore, SchedulingConfig, Scheduler,
};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apptcheck",
    version,
    about = "Normalize appointment times and check them against an appointment file"
)]
struct Cli {
    /// Log each validation step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML scheduling configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a local time to the canonical UTC storage form
    Normalize {
        /// `MM/dd/yy h:mm a` or `yyyy-MM-dd HH:mm:ss`
        local: String,
        /// IANA zone the local time is in (defaults to the configured viewer zone)
        #[arg(short, long)]
        zone: Option<String>,
    },
    /// Render a stored UTC time for a viewer
    Display {
        /// `yyyy-MM-dd HH:mm:ss` in UTC
        stored: String,
        #[arg(short, long)]
        zone: Option<String>,
    },
    /// Check a proposed appointment against business hours and existing appointments
    Validate {
        /// JSON array of stored appointments
        #[arg(short, long)]
        store: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(short, long)]
        zone: Option<String>,
        /// Id of the appointment being rescheduled
        #[arg(long)]
        exclude: Option<u64>,
    },
    /// List appointments starting within the reminder window
    Upcoming {
        #[arg(short, long)]
        store: PathBuf,
        /// Reference time, `yyyy-MM-dd HH:mm:ss` in UTC
        #[arg(long)]
        now: String,
        #[arg(short, long)]
        zone: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => SchedulingConfig::load(path)?,
        None => SchedulingConfig::default(),
    };

    match cli.command {
        Command::Normalize { local, zone } => {
            let zone = resolve_zone(zone.as_deref(), &config)?;
            let instant = normalize_for_storage(&local, zone)?;
            println!("{}", format_storage(&instant));
        }
        Command::Display { stored, zone } => {
            let zone = resolve_zone(zone.as_deref(), &config)?;
            let instant = parse_storage(&stored)?;
            println!("{}", format_for_display(&instant, zone));
        }
        Command::Validate {
            store,
            start,
            end,
            zone,
            exclude,
        } => {
            let zone = resolve_zone(zone.as_deref(), &config)?;
            let store = load_store(&store)?;
            let candidate = AppointmentInterval::new(
                normalize_for_storage(&start, zone)?,
                normalize_for_storage(&end, zone)?,
            );
            tracing::debug!(
                start = %format_storage(&candidate.start),
                end = %format_storage(&candidate.end),
                "validating candidate"
            );
            let hours = config.business_hours()?;
            if let Err(err) =
                validate_appointment(&candidate, exclude.map(AppointmentId), &store, &hours)
            {
                eprintln!("appointment rejected: {err}");
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
        Command::Upcoming { store, now, zone } => {
            let zone = resolve_zone(zone.as_deref(), &config)?;
            let now = parse_storage(&now)?;
            let scheduler = Scheduler::from_config(load_store(&store)?, &config)?;
            for appt in scheduler.upcoming(now)? {
                println!("{}", describe(&appt, zone));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_zone(zone: Option<&str>, config: &SchedulingConfig) -> Result<Tz> {
    Ok(match zone {
        Some(name) => parse_timezone(name)?,
        None => config.viewer_zone()?,
    })
}

fn load_store(path: &Path) -> Result<InMemoryStore> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let appointments: Vec<Appointment> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(count = appointments.len(), "loaded appointments");
    InMemoryStore::from_appointments(appointments)
        .with_context(|| format!("loading {}", path.display()))
}

fn describe(appt: &Appointment, zone: Tz) -> String {
    let interval = appt.interval();
    format!(
        "#{} {} - {} {}",
        appt.id.0,
        format_for_display(&interval.start, zone),
        format_for_display(&interval.end, zone),
        appt.title()
    )
    .trim_end()
    .to_string()
}

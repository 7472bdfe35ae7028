//! Offline residency report over a JSON crossing log.
//!
//! The input file is a JSON array of crossing submissions in the same shape
//! the record keeper accepts:
//!
//! ```json
//! [{ "type": "ENTRY", "date": "2024-01-05T08:00:00Z", "portOfEntry": "YVR" }]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;

use bordertally_core::SubjectId;
use bordertally_infra::{FixedClock, InMemoryCrossingStore, ResidencyConfig, ResidencyService};
use bordertally_presence::{DayAccount, NewCrossing, ReferenceZone, RepeatedEntryPolicy, ResidencyStats};

/// Count days present from a crossing log and report progress toward the
/// residency threshold.
#[derive(Parser, Debug, Clone)]
#[command(name = "bordertally-report", version, about, long_about = None)]
pub struct Args {
    /// JSON file holding an array of crossings
    #[arg(short, long)]
    pub input: PathBuf,

    /// Local date to count an open entry through (default: today in the reference offset)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Residency threshold in days (overrides BORDERTALLY_TARGET_DAYS)
    #[arg(long)]
    pub target: Option<u32>,

    /// Reference UTC offset for local days, e.g. -05:00 (overrides BORDERTALLY_UTC_OFFSET)
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<ReferenceZone>,

    /// Start a stay at the first of several consecutive entries instead of the latest
    #[arg(long)]
    pub keep_first_entry: bool,

    /// Include the per-stay accounting trace
    #[arg(long)]
    pub trace: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub stats: ResidencyStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<DayAccount>,
}

/// Command-line overrides layered on top of the environment config.
pub fn effective_config(args: &Args, mut config: ResidencyConfig) -> ResidencyConfig {
    if let Some(target) = args.target {
        config.target_days = target;
    }
    if let Some(zone) = args.utc_offset {
        config.zone = zone;
    }
    if args.keep_first_entry {
        config.repeated_entry = RepeatedEntryPolicy::KeepFirst;
    }
    config
}

/// Read, validate and account the crossing log named by `args`.
pub fn run(args: &Args, env_config: ResidencyConfig) -> anyhow::Result<Report> {
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let submissions: Vec<NewCrossing> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of crossings", args.input.display()))?;

    let config = effective_config(args, env_config);
    let now = match args.today {
        Some(today) => noon_of(today, config.zone)?,
        None => Utc::now(),
    };

    build_report(submissions, config, now, args.trace)
}

/// Account `submissions` for a single subject as of `now`.
pub fn build_report(
    submissions: Vec<NewCrossing>,
    config: ResidencyConfig,
    now: DateTime<Utc>,
    with_trace: bool,
) -> anyhow::Result<Report> {
    let service = ResidencyService::new(InMemoryCrossingStore::new(), FixedClock::new(now), config);
    let subject = SubjectId::new();

    let count = submissions.len();
    for (index, submission) in submissions.into_iter().enumerate() {
        service
            .record_crossing(subject, submission)
            .with_context(|| format!("crossing #{index} is invalid"))?;
    }
    tracing::info!(crossings = count, zone = %config.zone, "loaded crossing log");

    let account = service.account(subject)?;
    let stats = ResidencyStats::from_total(account.total_days, config.target_days);

    Ok(Report {
        stats,
        account: with_trace.then_some(account),
    })
}

/// Midday of a local date, as an instant; any time that day would do.
fn noon_of(day: NaiveDate, zone: ReferenceZone) -> anyhow::Result<DateTime<Utc>> {
    let local = day
        .and_hms_opt(12, 0, 0)
        .context("noon is a valid time")?
        .and_local_timezone(zone.offset())
        .single()
        .with_context(|| format!("{day} has no single noon at {zone}"))?;
    Ok(local.with_timezone(&Utc))
}

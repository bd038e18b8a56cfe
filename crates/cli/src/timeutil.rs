use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse `YYYY-MM-DD` as local midnight.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{input}', expected YYYY-MM-DD"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("Invalid date '{input}'"))?;
    local_to_utc(midnight, input)
}

/// Parse `YYYY-MM-DD HH:MM` in the local time zone.
pub fn parse_date_time(input: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), DATE_TIME_FORMAT)
        .with_context(|| format!("Invalid time '{input}', expected YYYY-MM-DD HH:MM"))?;
    local_to_utc(naive, input)
}

fn local_to_utc(naive: NaiveDateTime, input: &str) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("'{input}' does not exist in the local time zone"))
}

/// Upper bound for `--days` and the REPL day counts.
pub const MAX_DAYS: u32 = 3650;

/// A day count in `1..=MAX_DAYS`.
pub fn parse_days(input: &str) -> Option<u32> {
    input
        .trim()
        .parse()
        .ok()
        .filter(|days| (1..=MAX_DAYS).contains(days))
}

pub fn days_after(start: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
    start
        .checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| anyhow!("{days} days from {start} is out of range"))
}

/// Window for `plan`: explicit dates win, otherwise `start + days`.
pub fn plan_window(
    start: Option<&str>,
    end: Option<&str>,
    days: u32,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = match start {
        Some(s) => parse_date(s).context("Error parsing start date")?,
        None => now,
    };
    let end = match end {
        Some(e) => parse_date(e).context("Error parsing end date")?,
        None => days_after(start, days)?,
    };
    ensure_ordered(start, end)?;
    Ok((start, end))
}

pub fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= start {
        bail!("End time must be after start time");
    }
    Ok(())
}

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

mod ical;

pub use ical::ICalFormatter;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    /// One line per shift
    #[default]
    #[value(alias = "txt")]
    Text,
    /// iCalendar (.ics) for calendar import
    #[value(alias = "ics")]
    Ical,
    /// Bordered table
    Table,
    /// JSON document
    Json,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn ShiftFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Ical => Box::new(ICalFormatter::new()),
            OutputFormat::Table => Box::new(TableFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

/// A shift with its user already resolved to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftRow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub schedule_name: String,
}

pub trait ShiftFormatter {
    /// Render `shifts` covering the window `[start, end]`.
    fn format(
        &self,
        out: &mut dyn Write,
        shifts: &[ShiftRow],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()>;
}

/// `2024-03-20 09:00 +01:00`, in the local time zone.
pub fn local_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M %Z")
        .to_string()
}

fn local_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Calendar days between two instants, counted on local dates so a DST change
/// inside the window does not shorten it.
fn local_days(start: &DateTime<Utc>, end: &DateTime<Utc>) -> i64 {
    let start = start.with_timezone(&Local).date_naive();
    let end = end.with_timezone(&Local).date_naive();
    (end - start).num_days()
}

fn write_empty(out: &mut dyn Write, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    writeln!(
        out,
        "No shifts found from {} to {}",
        local_date(&start),
        local_date(&end)
    )?;
    Ok(())
}

pub struct TextFormatter;

impl ShiftFormatter for TextFormatter {
    fn format(
        &self,
        out: &mut dyn Write,
        shifts: &[ShiftRow],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()> {
        if shifts.is_empty() {
            return write_empty(out, start, end);
        }

        writeln!(out, "Shifts for the next {} days:", local_days(&start, &end))?;
        for shift in shifts {
            writeln!(
                out,
                "{} to {}: {}",
                local_time(&shift.start),
                local_time(&shift.end),
                shift.user_name
            )?;
        }

        Ok(())
    }
}

pub struct TableFormatter;

impl ShiftFormatter for TableFormatter {
    fn format(
        &self,
        out: &mut dyn Write,
        shifts: &[ShiftRow],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()> {
        if shifts.is_empty() {
            return write_empty(out, start, end);
        }

        let mut builder = Builder::default();
        builder.push_record(["Start", "End", "User", "Schedule"]);
        for shift in shifts {
            builder.push_record([
                local_time(&shift.start),
                local_time(&shift.end),
                shift.user_name.clone(),
                shift.schedule_name.clone(),
            ]);
        }

        let table = builder.build().with(Style::rounded()).to_string();
        writeln!(out, "{table}")?;
        Ok(())
    }
}

pub struct JsonFormatter;

impl ShiftFormatter for JsonFormatter {
    fn format(
        &self,
        out: &mut dyn Write,
        shifts: &[ShiftRow],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Document<'a> {
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            shifts: &'a [ShiftRow],
        }

        let document = Document { start, end, shifts };
        writeln!(out, "{}", serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }
}

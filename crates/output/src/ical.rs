//! iCalendar export of shifts.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, Event};

use crate::{ShiftFormatter, ShiftRow};

const PRODID: &str = "-//myshift//ON-CALL SCHEDULE//EN";
const ICAL_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

fn utc_stamp(ts: &DateTime<Utc>) -> String {
    ts.format(ICAL_UTC_FORMAT).to_string()
}

pub struct ICalFormatter {
    stamp: Option<DateTime<Utc>>,
}

impl ICalFormatter {
    pub fn new() -> Self {
        Self { stamp: None }
    }

    /// Use a fixed DTSTAMP instead of the current time.
    pub fn with_stamp(stamp: DateTime<Utc>) -> Self {
        Self { stamp: Some(stamp) }
    }

    fn event(&self, index: usize, shift: &ShiftRow, stamp: &str) -> Event {
        let mut event = Event::new();
        // TEXT values are escaped by icalendar when the calendar is rendered.
        event
            .uid(&format!("oncall-{index}-{}@myshift", shift.user_id))
            .summary(&format!("On-Call: {}", shift.user_name))
            .description(&format!(
                "On-call shift for {}\nSchedule: {}",
                shift.user_name, shift.schedule_name
            ))
            .add_property("DTSTAMP", stamp)
            .add_property("DTSTART", utc_stamp(&shift.start))
            .add_property("DTEND", utc_stamp(&shift.end))
            .add_property("CATEGORIES", "ON-CALL")
            .add_property("STATUS", "CONFIRMED")
            .add_property("TRANSP", "OPAQUE");
        event.done()
    }
}

impl Default for ICalFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ShiftFormatter for ICalFormatter {
    fn format(
        &self,
        out: &mut dyn Write,
        shifts: &[ShiftRow],
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<()> {
        let stamp = utc_stamp(&self.stamp.unwrap_or_else(Utc::now));

        let mut calendar = Calendar::new();
        for (index, shift) in shifts.iter().enumerate() {
            calendar.push(self.event(index, shift, &stamp));
        }

        out.write_all(normalize_header(&calendar.done().to_string()).as_bytes())?;
        Ok(())
    }
}

/// Pin the calendar header to our PRODID and an explicit CALSCALE, and make
/// sure every line ends in CRLF.
fn normalize_header(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len() + 64);

    for line in ics.lines() {
        if line.starts_with("PRODID:") || line.starts_with("CALSCALE:") {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");

        if line == "VERSION:2.0" {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            result.push_str("CALSCALE:GREGORIAN\r\n");
        }
    }

    result
}

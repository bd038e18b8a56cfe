use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use myshift_output::{OutputFormat, ShiftFormatter};
use tracing::debug;

use super::shifts::{fetch_schedule_shifts, to_rows, user_names};
use super::utils::ShiftContext;
use crate::timeutil::{plan_window, MAX_DAYS};

pub const DEFAULT_DAYS: u32 = 28;

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Number of days to show when --end is not given
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS))
    )]
    pub days: u32,
    /// First day of the plan (YYYY-MM-DD, defaults to now)
    #[arg(long)]
    pub start: Option<String>,
    /// Last day of the plan (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub async fn execute(args: PlanArgs, ctx: &ShiftContext<'_>, out: &mut dyn Write) -> Result<()> {
    let (start, end) = plan_window(
        args.start.as_deref(),
        args.end.as_deref(),
        args.days,
        Utc::now(),
    )?;
    let formatter = args.format.formatter();
    run(ctx, start, end, formatter.as_ref(), out).await
}

/// Print every shift of the schedule between `start` and `end`.
pub async fn run(
    ctx: &ShiftContext<'_>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    formatter: &dyn ShiftFormatter,
    out: &mut dyn Write,
) -> Result<()> {
    let shifts = fetch_schedule_shifts(ctx, start, end).await?;
    let names = user_names(ctx.api, &shifts).await;
    debug!(shifts = shifts.len(), users = names.len(), "Rendering plan");

    formatter.format(out, &to_rows(&shifts, &names), start, end)
}

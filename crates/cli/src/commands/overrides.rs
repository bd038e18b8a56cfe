use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use myshift_api::Override;
use myshift_output::local_time;
use tracing::{debug, info};

use super::shifts::fetch_user_shifts;
use super::utils::ShiftContext;
use crate::timeutil::{ensure_ordered, parse_date_time};

#[derive(Args, Debug, Clone)]
pub struct OverrideArgs {
    /// Email of the user taking over the shifts
    #[arg(short, long)]
    pub user: Option<String>,
    /// Email of the user whose shifts are covered
    #[arg(short, long)]
    pub target: String,
    /// Start of the override window (YYYY-MM-DD HH:MM, local time)
    #[arg(short, long)]
    pub start: String,
    /// End of the override window (YYYY-MM-DD HH:MM, local time)
    #[arg(short, long)]
    pub end: String,
}

pub async fn execute(
    args: OverrideArgs,
    ctx: &ShiftContext<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    let user = ctx.require_user_email(args.user.as_deref())?;
    let start = parse_date_time(&args.start).context("Error parsing start time")?;
    let end = parse_date_time(&args.end).context("Error parsing end time")?;
    run(ctx, user, &args.target, start, end, out).await
}

/// Hand every shift `target` has inside `[start, end]` over to `email`.
pub async fn run(
    ctx: &ShiftContext<'_>,
    email: &str,
    target: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    out: &mut dyn Write,
) -> Result<()> {
    ensure_ordered(start, end)?;

    let user = ctx
        .api
        .find_user_by_email(email)
        .await
        .with_context(|| format!("Error finding user {email}"))?;
    let target_user = ctx
        .api
        .find_user_by_email(target)
        .await
        .with_context(|| format!("Error finding target user {target}"))?;

    let shifts = fetch_user_shifts(ctx, &target_user.id, start, end).await?;
    if shifts.is_empty() {
        bail!("no shifts found for target user {target} in the specified time range");
    }

    let overrides = clip_to_window(&user.id, shifts.iter().map(|s| (s.start, s.end)), start, end);
    debug!(count = overrides.len(), schedule_id = %ctx.schedule_id, "Creating overrides");

    ctx.api
        .create_overrides(&ctx.schedule_id, &overrides)
        .await
        .context("Error creating overrides")?;
    info!(count = overrides.len(), user = %user.id, target = %target_user.id, "Overrides created");

    writeln!(
        out,
        "Successfully created {} override(s) for {}",
        overrides.len(),
        user.name
    )?;
    for (i, created) in overrides.iter().enumerate() {
        writeln!(out, "Override {}:", i + 1)?;
        writeln!(out, "  Start: {}", local_time(&created.start))?;
        writeln!(out, "  End: {}", local_time(&created.end))?;
    }

    Ok(())
}

/// One override per shift, trimmed so none extends past the requested window.
fn clip_to_window(
    user_id: &str,
    shifts: impl Iterator<Item = (DateTime<Utc>, DateTime<Utc>)>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Override> {
    shifts
        .map(|(s, e)| (s.max(start), e.min(end)))
        .filter(|(s, e)| s < e)
        .map(|(s, e)| Override::for_user(user_id, s, e))
        .collect()
}

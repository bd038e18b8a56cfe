use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use myshift_output::{OutputFormat, ShiftFormatter};

use super::shifts::{fetch_user_shifts, to_rows};
use super::utils::ShiftContext;
use crate::timeutil::{days_after, MAX_DAYS};

pub const DEFAULT_DAYS: u32 = 28;

#[derive(Args, Debug, Clone)]
pub struct UpcomingArgs {
    /// User email (defaults to my_user from the configuration)
    #[arg(short, long)]
    pub user: Option<String>,
    /// Number of days to look ahead
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS))
    )]
    pub days: u32,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub async fn execute(
    args: UpcomingArgs,
    ctx: &ShiftContext<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    let email = ctx.require_user_email(args.user.as_deref())?;
    let formatter = args.format.formatter();
    run(ctx, email, args.days, Utc::now(), formatter.as_ref(), out).await
}

pub async fn run(
    ctx: &ShiftContext<'_>,
    email: &str,
    days: u32,
    now: DateTime<Utc>,
    formatter: &dyn ShiftFormatter,
    out: &mut dyn Write,
) -> Result<()> {
    let user = ctx
        .api
        .find_user_by_email(email)
        .await
        .with_context(|| format!("Error finding user {email}"))?;

    let until = days_after(now, days)?;
    let shifts = fetch_user_shifts(ctx, &user.id, now, until).await?;

    let mut names = HashMap::new();
    if !user.name.is_empty() {
        names.insert(user.id.clone(), user.name);
    }

    formatter.format(out, &to_rows(&shifts, &names), now, until)
}

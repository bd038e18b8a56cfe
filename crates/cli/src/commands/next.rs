use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use myshift_output::local_time;
use tracing::debug;

use super::shifts::fetch_user_shifts;
use super::utils::ShiftContext;
use crate::timeutil::{days_after, MAX_DAYS};

pub const DEFAULT_DAYS: u32 = 90;

#[derive(Args, Debug, Clone)]
pub struct NextArgs {
    /// User email (defaults to my_user from the configuration)
    #[arg(short, long)]
    pub user: Option<String>,
    /// How many days ahead to search
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS))
    )]
    pub days: u32,
}

pub async fn execute(args: NextArgs, ctx: &ShiftContext<'_>, out: &mut dyn Write) -> Result<()> {
    let email = ctx.require_user_email(args.user.as_deref())?;
    run(ctx, email, args.days, Utc::now(), out).await
}

/// Report whether `email` is on call at `now`, or when their next shift starts.
pub async fn run(
    ctx: &ShiftContext<'_>,
    email: &str,
    days: u32,
    now: DateTime<Utc>,
    out: &mut dyn Write,
) -> Result<()> {
    let user = ctx
        .api
        .find_user_by_email(email)
        .await
        .with_context(|| format!("Error finding user {email}"))?;
    debug!(user_id = %user.id, days, "Looking up next shift");

    let shifts = fetch_user_shifts(ctx, &user.id, now, days_after(now, days)?).await?;

    // Shifts come back sorted by start, so the first one is the earliest.
    match shifts.first() {
        Some(shift) if shift.covers(now) => {
            writeln!(out, "Currently on call")?;
            writeln!(out, "Shift ends: {}", local_time(&shift.end))?;
        }
        Some(shift) if shift.start > now => {
            writeln!(out, "Next shift:")?;
            writeln!(out, "Starts: {}", local_time(&shift.start))?;
            writeln!(out, "Ends: {}", local_time(&shift.end))?;
        }
        _ => writeln!(out, "No upcoming shifts found")?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{hours, now, MockApi};

    async fn render(api: &MockApi, now: DateTime<Utc>) -> Result<String> {
        let ctx = ShiftContext::new(api, "PSCHED1");
        let mut out = Vec::new();
        run(&ctx, "ada@example.com", DEFAULT_DAYS, now, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn ada() -> MockApi {
        MockApi::new().with_user("P1", "Ada Lovelace", "ada@example.com")
    }

    #[tokio::test]
    async fn test_next_currently_on_call() {
        let now = now();
        let api = ada().with_shift("P1", now - hours(2), now + hours(6));

        let output = render(&api, now).await.unwrap();
        assert!(output.starts_with("Currently on call\n"));
        assert!(output.contains(&format!("Shift ends: {}", local_time(&(now + hours(6))))));
    }

    #[tokio::test]
    async fn test_next_future_shift() {
        let now = now();
        let api = ada()
            .with_shift("P1", now + hours(48), now + hours(56))
            .with_shift("P1", now + hours(24), now + hours(32));

        let output = render(&api, now).await.unwrap();
        assert!(output.starts_with("Next shift:\n"));
        assert!(output.contains(&format!("Starts: {}", local_time(&(now + hours(24))))));
        assert!(output.contains(&format!("Ends: {}", local_time(&(now + hours(32))))));
    }

    #[tokio::test]
    async fn test_next_no_shifts() {
        let now = now();
        let api = ada().with_shift("P2", now + hours(1), now + hours(2));

        let output = render(&api, now).await.unwrap();
        assert_eq!(output, "No upcoming shifts found\n");
    }

    #[tokio::test]
    async fn test_next_unknown_user() {
        let api = MockApi::new();

        let err = render(&api, now()).await.unwrap_err();
        assert!(err.to_string().contains("Error finding user ada@example.com"));
    }

    #[tokio::test]
    async fn test_next_queries_user_window() {
        let now = now();
        let api = ada();
        render(&api, now).await.unwrap();

        let queries = api.on_call_queries.lock().unwrap();
        let query = &queries[0];
        let pair = |k: &str, v: String| (k.to_string(), v);
        let until = days_after(now, DEFAULT_DAYS).unwrap();

        assert!(query.contains(&pair("user_ids[]", "P1".to_string())));
        assert!(query.contains(&pair("since", now.format("%Y-%m-%dT%H:%M:%SZ").to_string())));
        assert!(query.contains(&pair("until", until.format("%Y-%m-%dT%H:%M:%SZ").to_string())));
    }

    #[tokio::test]
    async fn test_execute_requires_user() {
        let api = ada();
        let ctx = ShiftContext::new(&api, "PSCHED1");
        let args = NextArgs {
            user: None,
            days: DEFAULT_DAYS,
        };

        let err = execute(args, &ctx, &mut Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("--user is required"));
    }
}

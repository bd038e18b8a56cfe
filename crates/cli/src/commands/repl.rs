//! Interactive shell over the shift commands.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use myshift_output::TextFormatter;
use tracing::debug;

use super::utils::ShiftContext;
use super::{next, overrides, plan, upcoming};
use crate::timeutil::{days_after, parse_date_time, parse_days};

const PROMPT: &str = "(myshift) ";
const PLAN_DAYS: u32 = 7;

enum Flow {
    Continue,
    Quit,
}

/// Read commands from `input` until EOF, `quit` or `exit`.
pub async fn run<R: BufRead>(
    ctx: &ShiftContext<'_>,
    mut input: R,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "Welcome to MyShift REPL. Type 'help' or '?' to list commands.")?;
    writeln!(out, "Type 'quit' or 'exit' to quit, or use Ctrl+C.")?;

    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line).context("Error reading input")? == 0 {
            break;
        }

        let Some(words) = shlex::split(line.trim()) else {
            writeln!(out, "Error: unbalanced quotes in input")?;
            continue;
        };
        let Some((command, args)) = words.split_first() else {
            continue;
        };
        debug!(command = %command, args = args.len(), "REPL command");

        if let Flow::Quit = dispatch(ctx, command, args, out).await? {
            break;
        }
    }

    Ok(())
}

async fn dispatch(
    ctx: &ShiftContext<'_>,
    command: &str,
    args: &[String],
    out: &mut dyn Write,
) -> Result<Flow> {
    let outcome = match command {
        "help" | "?" => {
            print_help(ctx, out)?;
            Ok(())
        }
        "quit" | "exit" => {
            writeln!(out, "Goodbye!")?;
            return Ok(Flow::Quit);
        }
        "next" => handle_next(ctx, args, out).await,
        "plan" => handle_plan(ctx, args, out).await,
        "upcoming" => handle_upcoming(ctx, args, out).await,
        "override" => handle_override(ctx, args, out).await,
        other => {
            writeln!(
                out,
                "Unknown command: {other}. Type 'help' for available commands."
            )?;
            Ok(())
        }
    };

    if let Err(err) = outcome {
        writeln!(out, "Error: {err:#}")?;
    }
    Ok(Flow::Continue)
}

fn print_help(ctx: &ShiftContext<'_>, out: &mut dyn Write) -> Result<()> {
    let default_user = ctx
        .my_user
        .as_deref()
        .map(|user| format!(" (defaults to {user})"))
        .unwrap_or_default();

    write!(
        out,
        "Available commands:

  next [email] [days]                     Show the next on-call shift for a user{default_user}
  plan [days]                             Show planned shifts (default: {PLAN_DAYS} days)
  upcoming [email] [days]                 Show upcoming shifts for a user{default_user} (default: {} days)
  override <user> <target> <start> <end>  Create an override
  help, ?                                 Show this help message
  quit, exit                              Exit the REPL

Examples:
  next
  next user@example.com
  plan 14
  upcoming 7
  upcoming user@example.com 7
  override user@example.com target@example.com \"2024-03-20 09:00\" \"2024-03-20 17:00\"

",
        upcoming::DEFAULT_DAYS
    )?;
    Ok(())
}

/// `[email] [days]`, where a lone numeric argument is the day count.
/// Returns the offending text when the day count is not in range.
fn user_and_days(
    args: &[String],
    default_days: u32,
) -> std::result::Result<(Option<&str>, u32), String> {
    match args {
        [] => Ok((None, default_days)),
        [only] if only.chars().all(|c| c.is_ascii_digit()) => parse_days(only)
            .map(|days| (None, days))
            .ok_or_else(|| only.clone()),
        [only] => Ok((Some(only.as_str()), default_days)),
        [email, days, ..] => parse_days(days)
            .map(|days| (Some(email.as_str()), days))
            .ok_or_else(|| days.clone()),
    }
}

async fn handle_next(ctx: &ShiftContext<'_>, args: &[String], out: &mut dyn Write) -> Result<()> {
    let (email, days) = match user_and_days(args, next::DEFAULT_DAYS) {
        Ok(parsed) => parsed,
        Err(bad) => {
            writeln!(out, "Invalid days value: {bad}")?;
            return Ok(());
        }
    };
    let Some(email) = ctx.user_email(email) else {
        writeln!(
            out,
            "Usage: next [email] - email is required or set my_user in configuration"
        )?;
        return Ok(());
    };

    next::run(ctx, email, days, Utc::now(), out).await
}

async fn handle_plan(ctx: &ShiftContext<'_>, args: &[String], out: &mut dyn Write) -> Result<()> {
    let days = match args.first() {
        None => PLAN_DAYS,
        Some(raw) => match parse_days(raw) {
            Some(days) => days,
            None => {
                writeln!(out, "Invalid days value: {raw}")?;
                return Ok(());
            }
        },
    };

    let start = Utc::now();
    plan::run(ctx, start, days_after(start, days)?, &TextFormatter, out).await
}

async fn handle_upcoming(
    ctx: &ShiftContext<'_>,
    args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let (email, days) = match user_and_days(args, upcoming::DEFAULT_DAYS) {
        Ok(parsed) => parsed,
        Err(bad) => {
            writeln!(out, "Invalid days value: {bad}")?;
            return Ok(());
        }
    };
    let Some(email) = ctx.user_email(email) else {
        writeln!(
            out,
            "Usage: upcoming [email] [days] - email is required or set my_user in configuration"
        )?;
        return Ok(());
    };

    upcoming::run(ctx, email, days, Utc::now(), &TextFormatter, out).await
}

async fn handle_override(
    ctx: &ShiftContext<'_>,
    args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let [user, target, start, end, ..] = args else {
        writeln!(out, "Usage: override <user-email> <target-email> <start> <end>")?;
        writeln!(
            out,
            "Example: override user@example.com target@example.com \"2024-03-20 09:00\" \"2024-03-20 17:00\""
        )?;
        return Ok(());
    };

    let start = parse_date_time(start).context("Error parsing start time")?;
    let end = parse_date_time(end).context("Error parsing end time")?;
    overrides::run(ctx, user, target, start, end, out).await
}

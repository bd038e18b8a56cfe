mod commands;
mod timeutil;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::config::ConfigArgs;
use commands::next::NextArgs;
use commands::overrides::OverrideArgs;
use commands::plan::PlanArgs;
use commands::upcoming::UpcomingArgs;
use commands::utils::ShiftContext;
use myshift_api::{ApiClient, ApiError};
use myshift_config::Config;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "myshift",
    version,
    about = "PagerDuty on-call schedule management tool",
    long_about = None
)]
struct Cli {
    /// Path to config file (defaults to ~/.config/myshift.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Schedule ID (overrides schedule_id from the config file)
    #[arg(long, global = true)]
    schedule: Option<String>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: MyShiftCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum MyShiftCommand {
    #[command(flatten)]
    Shift(ShiftCommand),
    /// Show, print or validate the configuration
    Config(ConfigArgs),
}

/// Commands that talk to PagerDuty.
#[derive(Subcommand, Debug, Clone)]
enum ShiftCommand {
    /// Show the next on-call shift for a user
    Next(NextArgs),
    /// List upcoming shifts for a user
    Upcoming(UpcomingArgs),
    /// Show everyone's shifts in the schedule
    Plan(PlanArgs),
    /// Cover another user's shifts with overrides
    Override(OverrideArgs),
    /// Start an interactive shell
    Repl,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.debug) {
        eprintln!("{err}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        MyShiftCommand::Config(args) => {
            commands::config::execute(args, cli.config.as_deref(), &mut out)
        }
        MyShiftCommand::Shift(command) => {
            run_shift_command(
                command,
                cli.config.as_deref(),
                cli.schedule.as_deref(),
                &mut out,
            )
            .await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = out.flush();
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "warn,myshift=debug,myshift_api=debug,myshift_config=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}

async fn run_shift_command(
    command: ShiftCommand,
    config_path: Option<&Path>,
    schedule: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let (config, path) = Config::load(config_path)?;
    let schedule_id = resolve_schedule(schedule, &config).ok_or_else(|| {
        anyhow!(
            "schedule_id must be configured in {} or passed with --schedule",
            path.display()
        )
    })?;

    let client = build_client(&config)?;
    debug!(base_url = %client.base_url(), schedule_id, "Using PagerDuty");
    let ctx = ShiftContext::new(&client, schedule_id).with_my_user(config.my_user.clone());

    match command {
        ShiftCommand::Next(args) => commands::next::execute(args, &ctx, out).await,
        ShiftCommand::Upcoming(args) => commands::upcoming::execute(args, &ctx, out).await,
        ShiftCommand::Plan(args) => commands::plan::execute(args, &ctx, out).await,
        ShiftCommand::Override(args) => commands::overrides::execute(args, &ctx, out).await,
        ShiftCommand::Repl => commands::repl::run(&ctx, io::stdin().lock(), out).await,
    }
}

fn resolve_schedule<'a>(flag: Option<&'a str>, config: &'a Config) -> Option<&'a str> {
    flag.map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| config.schedule_id())
}

fn build_client(config: &Config) -> Result<ApiClient> {
    let token = config.pagerduty_token.clone();
    let api_url = config
        .api_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    let client = match api_url {
        Some(url) => ApiClient::new(url)?.with_api_token(token),
        None => ApiClient::pagerduty(token)?,
    };
    Ok(client)
}

fn report_error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "Error:".red().bold());

    let hint = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(ApiError::suggestion);
    if let Some(hint) = hint {
        eprintln!("{} {hint}", "Hint:".yellow());
    }
}

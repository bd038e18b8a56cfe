use std::io::Write;
use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use myshift_config::{sample, search_paths, Config, ValidationReport};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print a sample configuration file
    #[arg(long, conflicts_with = "validate")]
    pub print: bool,
    /// Validate the configuration and show details
    #[arg(long)]
    pub validate: bool,
}

pub fn execute(args: ConfigArgs, explicit: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    if args.print {
        write!(out, "{}", sample())?;
        return Ok(());
    }

    if args.validate {
        let report = ValidationReport::check(explicit);
        print_report(&report, out)?;
        if !report.valid {
            bail!("Configuration is not valid");
        }
        return Ok(());
    }

    let (config, path) = Config::load(explicit)?;
    let locations = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => search_paths(),
    };

    writeln!(out, "Configuration loaded successfully from one of:")?;
    for location in &locations {
        writeln!(out, "  {}", location.display())?;
    }
    writeln!(out, "Using: {}", path.display())?;
    writeln!(out, "PagerDuty token: {}", mask_token(&config.pagerduty_token))?;
    writeln!(
        out,
        "Schedule ID: {}",
        config.schedule_id().unwrap_or("(not set)")
    )?;
    writeln!(out, "My user: {}", config.my_user().unwrap_or("(not set)"))?;
    Ok(())
}

/// Keep the first and last four characters; short tokens are fully masked.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

fn print_report(report: &ValidationReport, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Configuration Validation Report")?;
    writeln!(out, "==============================")?;
    writeln!(out)?;

    writeln!(out, "Searched locations:")?;
    for location in &report.locations {
        if report.config_path.as_ref() == Some(location) {
            writeln!(out, "  {} {} (FOUND)", "✓".green(), location.display())?;
        } else {
            writeln!(out, "  {} {}", "✗".dimmed(), location.display())?;
        }
    }
    writeln!(out)?;

    let Some(path) = &report.config_path else {
        writeln!(out, "Status: {}", "NO CONFIGURATION FOUND".red().bold())?;
        writeln!(out)?;
        writeln!(out, "Please create a configuration file using:")?;
        writeln!(out, "  myshift config --print > ~/.config/myshift.yaml")?;
        return Ok(());
    };

    writeln!(out, "Configuration file: {}", path.display())?;
    if report.valid {
        writeln!(out, "Status: {}", "VALID".green().bold())?;
    } else {
        writeln!(out, "Status: {}", "INVALID".red().bold())?;
    }
    writeln!(out)?;

    if !report.required_fields.is_empty() {
        writeln!(out, "Required fields:")?;
        for (field, present) in &report.required_fields {
            if *present {
                writeln!(out, "  {} {field}: present", "✓".green())?;
            } else {
                writeln!(out, "  {} {field}: MISSING", "✗".red())?;
            }
        }
        writeln!(out)?;
    }

    if !report.optional_fields.is_empty() {
        writeln!(out, "Optional fields:")?;
        for (field, present) in &report.optional_fields {
            if *present {
                writeln!(out, "  {} {field}: present", "✓".green())?;
            } else {
                writeln!(out, "  - {field}: not set")?;
            }
        }
        writeln!(out)?;
    }

    if !report.errors.is_empty() {
        writeln!(out, "Errors:")?;
        for err in &report.errors {
            writeln!(out, "  {} {err}", "✗".red())?;
        }
        writeln!(out)?;
    }

    if !report.warnings.is_empty() {
        writeln!(out, "Warnings:")?;
        for warning in &report.warnings {
            writeln!(out, "  {} {warning}", "!".yellow())?;
        }
        writeln!(out)?;
    }

    if !report.valid {
        writeln!(out, "Next steps:")?;
        writeln!(out, "  1. Edit your configuration file:")?;
        writeln!(out, "     {}", path.display())?;
        writeln!(out, "  2. Add the missing required fields")?;
        writeln!(out, "  3. Run 'myshift config --validate' again to verify")?;
        writeln!(out)?;
        writeln!(out, "For a sample configuration:")?;
        writeln!(out, "  myshift config --print")?;
    } else if !report.warnings.is_empty() {
        writeln!(
            out,
            "Configuration is valid but consider setting the optional fields above."
        )?;
    } else {
        writeln!(out, "Configuration is complete.")?;
    }

    Ok(())
}

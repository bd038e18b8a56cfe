use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "myshift.yaml";

pub const TOKEN_ENV: &str = "MYSHIFT_PAGERDUTY_TOKEN";
pub const SCHEDULE_ENV: &str = "MYSHIFT_SCHEDULE_ID";
pub const MY_USER_ENV: &str = "MYSHIFT_MY_USER";

const SAMPLE_CONFIG: &str = r#"# MyShift Configuration
# This file should be placed in one of the following locations:
# - Linux: ~/.config/myshift.yaml (or $XDG_CONFIG_HOME/myshift.yaml)
# - macOS: ~/Library/Application Support/myshift.yaml

# PagerDuty API token (required)
# Can also be supplied through the MYSHIFT_PAGERDUTY_TOKEN environment variable
pagerduty_token: "your-pagerduty-token"

# Default schedule ID (optional)
# schedule_id: "your-default-schedule-id"

# Your PagerDuty email address (optional)
# Used when no --user is provided
# my_user: "your-email@example.com"
"#;

/// Settings read from `myshift.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub pagerduty_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_user: Option<String>,
    /// Alternative API root, mainly for testing against a mock server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from the provided path or the first existing
    /// default location, then apply environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<(Self, PathBuf)> {
        let path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => find_existing(&search_paths()).ok_or_else(|| {
                anyhow!(
                    "No configuration file found. Please create one using 'myshift config --print'"
                )
            })?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(path = %path.display(), "Loaded configuration");
        Ok((config, path))
    }

    /// Read and parse a config file without validating it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file at {}", path.display()))?;

        let config: Option<Config> = serde_yaml::from_str(&raw)
            .with_context(|| format!("Malformed YAML in config file {}", path.display()))?;

        // An empty file parses as `null`.
        Ok(config.unwrap_or_default())
    }

    /// Overlay non-empty values from the environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup(TOKEN_ENV) {
            debug!(env = TOKEN_ENV, "Using token from environment");
            self.pagerduty_token = token;
        }
        if let Some(schedule) = lookup(SCHEDULE_ENV) {
            self.schedule_id = Some(schedule);
        }
        if let Some(user) = lookup(MY_USER_ENV) {
            self.my_user = Some(user);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pagerduty_token.trim().is_empty() {
            bail!("'pagerduty_token' is required in configuration");
        }
        Ok(())
    }

    pub fn schedule_id(&self) -> Option<&str> {
        self.schedule_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn my_user(&self) -> Option<&str> {
        self.my_user.as_deref().filter(|s| !s.is_empty())
    }
}

/// Commented sample configuration for `myshift config --print`.
pub fn sample() -> &'static str {
    SAMPLE_CONFIG
}

/// Candidate config files, highest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    let xdg = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    paths_for(&home, xdg.as_deref(), cfg!(target_os = "macos"))
}

fn paths_for(home: &Path, xdg_config_home: Option<&Path>, macos: bool) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    match xdg_config_home {
        Some(xdg) => paths.push(xdg.join(CONFIG_FILE_NAME)),
        None => paths.push(home.join(".config").join(CONFIG_FILE_NAME)),
    }

    if macos {
        paths.push(
            home.join("Library")
                .join("Application Support")
                .join(CONFIG_FILE_NAME),
        );
    }

    paths
}

fn find_existing(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|p| p.is_file()).cloned()
}

/// Outcome of `myshift config --validate`.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub locations: Vec<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub required_fields: BTreeMap<&'static str, bool>,
    pub optional_fields: BTreeMap<&'static str, bool>,
}

impl ValidationReport {
    /// Validate the explicit path, or the first existing default location.
    pub fn check(explicit: Option<&Path>) -> Self {
        let locations = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => search_paths(),
        };
        Self::check_locations(locations, |key| std::env::var(key).ok())
    }

    pub fn check_locations<F>(locations: Vec<PathBuf>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut report = ValidationReport {
            config_path: find_existing(&locations),
            locations,
            ..Default::default()
        };

        let Some(path) = report.config_path.clone() else {
            report
                .errors
                .push("No configuration file found in any of the standard locations".to_string());
            return report;
        };

        let mut config = match Config::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                report.errors.push(format!(
                    "Error loading config from {}: {err:#}",
                    path.display()
                ));
                return report;
            }
        };
        config.apply_overrides(env);

        report.valid = true;

        let has_token = !config.pagerduty_token.trim().is_empty();
        report.required_fields.insert("pagerduty_token", has_token);
        if !has_token {
            report
                .errors
                .push("Required field 'pagerduty_token' is missing or empty".to_string());
            report.valid = false;
        }

        let has_schedule = config.schedule_id().is_some();
        let has_user = config.my_user().is_some();
        report.optional_fields.insert("schedule_id", has_schedule);
        report.optional_fields.insert("my_user", has_user);

        if !has_schedule {
            report.warnings.push(
                "Optional field 'schedule_id' is not set - you'll need to pass --schedule to each command"
                    .to_string(),
            );
        }
        if !has_user {
            report.warnings.push(
                "Optional field 'my_user' is not set - you'll need to specify --user for next/upcoming commands"
                    .to_string(),
            );
        }

        report
    }
}

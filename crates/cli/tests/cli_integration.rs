use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::{NamedTempFile, TempDir};

/// Run the binary with an isolated home so no real config is picked up.
fn myshift(args: &[&str], home: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_myshift"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("MYSHIFT_PAGERDUTY_TOKEN")
        .env_remove("MYSHIFT_SCHEDULE_ID")
        .env_remove("MYSHIFT_MY_USER")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute command")
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = myshift(&["--version"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("myshift"));
    assert!(stdout.contains("0.1."));
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = myshift(&["--help"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for command in ["next", "upcoming", "plan", "override", "repl", "config"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_override_help() {
    let home = TempDir::new().unwrap();
    let output = myshift(&["override", "--help"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--target"));
    assert!(stdout.contains("--start"));
    assert!(stdout.contains("--end"));
}

#[test]
fn test_plan_help_lists_formats() {
    let home = TempDir::new().unwrap();
    let output = myshift(&["plan", "--help"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ical"));
    assert!(stdout.contains("text"));
}

#[test]
fn test_invalid_command() {
    let home = TempDir::new().unwrap();
    let output = myshift(&["invalid-command"], home.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:") || stderr.contains("unrecognized"));
}

#[test]
fn test_config_print() {
    let home = TempDir::new().unwrap();
    let output = myshift(&["config", "--print"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pagerduty_token:"));
    assert!(stdout.contains("# schedule_id:"));
}

#[test]
fn test_config_validate_valid_file() {
    let home = TempDir::new().unwrap();
    let file = config_file("pagerduty_token: abcdefghijkl\nschedule_id: PSCHED1\n");
    let path = file.path().to_str().unwrap();
    let output = myshift(&["--config", path, "config", "--validate"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Status: VALID"));
    assert!(stdout.contains("my_user: not set"));
}

#[test]
fn test_config_validate_invalid_file() {
    let home = TempDir::new().unwrap();
    let file = config_file("schedule_id: PSCHED1\n");
    let path = file.path().to_str().unwrap();
    let output = myshift(&["config", "--validate", "--config", path], home.path());

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Status: INVALID"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_config_shows_masked_token() {
    let home = TempDir::new().unwrap();
    let file = config_file("pagerduty_token: abcd1234567890wxyz\n");
    let path = file.path().to_str().unwrap();
    let output = myshift(&["--config", path, "config"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PagerDuty token: abcd**********wxyz"));
    assert!(stdout.contains("Schedule ID: (not set)"));
}

#[test]
fn test_missing_config_file() {
    let home = TempDir::new().unwrap();
    let output = myshift(&["plan"], home.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No configuration file found"));
    assert!(stderr.contains("myshift config --print"));
}

#[test]
fn test_missing_schedule() {
    let home = TempDir::new().unwrap();
    let file = config_file("pagerduty_token: abcdefghijkl\n");
    let path = file.path().to_str().unwrap();
    let output = myshift(&["--config", path, "plan"], home.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("schedule_id must be configured"));
}

#[test]
fn test_config_found_in_xdg_home() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join(".config")).unwrap();
    std::fs::write(
        home.path().join(".config").join("myshift.yaml"),
        "pagerduty_token: abcdefghijkl\n",
    )
    .unwrap();

    let output = myshift(&["config"], home.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("myshift.yaml"));
    assert!(stdout.contains("PagerDuty token: abcd****ijkl"));
}

//! Command-line interface

use crate::types::PingMode;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// speedlog - run an internet speed test and keep a per-device history
#[derive(Parser, Debug, Clone)]
#[command(name = "speedlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding one log folder per device
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Device identity (defaults to the host name)
    #[arg(long, global = true, value_name = "NAME")]
    pub device: Option<String>,

    /// How ping and jitter are derived: probe or endpoint
    #[arg(long, global = true, value_name = "MODE")]
    pub ping_mode: Option<PingMode>,

    /// Latency probe target (host or host:port)
    #[arg(long, global = true, value_name = "HOST")]
    pub ping_host: Option<String>,

    /// Number of latency probes per test
    #[arg(long, global = true, value_name = "N")]
    pub ping_count: Option<u32>,

    /// Request timeout in seconds
    #[arg(short, long, global = true, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Speed test server (can be used multiple times)
    #[arg(long = "server", global = true, action = ArgAction::Append, value_name = "URL")]
    pub servers: Vec<String>,

    /// Number of history rows to show
    #[arg(long, global = true, value_name = "N")]
    pub rows: Option<usize>,

    /// Force colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit machine-readable JSON instead of the dashboard
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run a speed test, log it and show the history (default)
    Run,
    /// Show the logged history without measuring
    History,
    /// List supported environment variables and print an example .env
    Env,
}

impl Cli {
    /// Subcommand to execute; `run` when none was given
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(device) = &self.device {
            if device.trim().is_empty() {
                return Err("--device cannot be empty".to_string());
            }
        }

        if self.json && self.command() == Command::Env {
            return Err("--json is not supported by the env command".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.json {
            false
        } else if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::parse_from(["speedlog"]);
        assert_eq!(cli.command(), Command::Run);
        assert!(cli.servers.is_empty());
        assert!(cli.timeout.is_none());
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::parse_from([
            "speedlog",
            "run",
            "--data-dir", "/tmp/logs",
            "--device", "desk",
            "--ping-mode", "endpoint",
            "--ping-host", "1.1.1.1:443",
            "--ping-count", "4",
            "--timeout", "15",
            "--server", "https://a.example",
            "--server", "https://b.example",
            "--rows", "20",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.command(), Command::Run);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(cli.device.as_deref(), Some("desk"));
        assert_eq!(cli.ping_mode, Some(PingMode::Endpoint));
        assert_eq!(cli.ping_host.as_deref(), Some("1.1.1.1:443"));
        assert_eq!(cli.ping_count, Some(4));
        assert_eq!(cli.timeout, Some(15));
        assert_eq!(cli.servers, vec!["https://a.example", "https://b.example"]);
        assert_eq!(cli.rows, Some(20));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::parse_from(["speedlog", "--device", "desk", "--json", "history"]);
        assert_eq!(cli.command(), Command::History);
        assert_eq!(cli.device.as_deref(), Some("desk"));
        assert!(cli.json);
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_invalid_ping_mode_rejected() {
        assert!(Cli::try_parse_from(["speedlog", "--ping-mode", "icmp"]).is_err());
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration("10"), Ok(10));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("301").is_err());
        assert!(parse_duration("+5").is_err());
        assert!(parse_duration("0x10").is_err());
        assert!(parse_duration("ten").is_err());
    }

    #[test]
    fn test_validation() {
        let cli = Cli::parse_from(["speedlog", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["speedlog", "--device", " "]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["speedlog", "env", "--json"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["speedlog", "history", "--rows", "5"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_use_colors_flags() {
        assert!(Cli::parse_from(["speedlog", "--color"]).use_colors());
        assert!(!Cli::parse_from(["speedlog", "--no-color"]).use_colors());
    }
}

//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(data_dir) = &cli.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(device) = &cli.device {
            config.device = Some(device.trim().to_string());
        }
        if let Some(ping_mode) = cli.ping_mode {
            config.ping_mode = ping_mode;
        }
        if let Some(ping_host) = &cli.ping_host {
            config.ping_host = ping_host.trim().to_string();
        }
        if let Some(ping_count) = cli.ping_count {
            config.ping_count = ping_count;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }
        if !cli.servers.is_empty() {
            config.servers = cli.servers.clone();
        }
        if let Some(rows) = cli.rows {
            config.history_rows = rows;
        }

        if cli.color {
            config.enable_color = true;
        }
        if cli.no_color || cli.json {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Data directory: {}", config.data_dir.display()));
    summary.push(format!("Device identity: {}", config.identity()));
    summary.push(format!("Speed test servers: {}", config.servers.join(", ")));
    summary.push(format!("Ping mode: {}", config.ping_mode));
    summary.push(format!(
        "Ping probes: {} x {} ({}s timeout)",
        config.ping_count, config.ping_host, config.ping_timeout_seconds
    ));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!(
        "Transfer sizes: {} bytes down, {} bytes up",
        config.download_bytes, config.upload_bytes
    ));
    summary.push(format!("History rows: {}", config.history_rows));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

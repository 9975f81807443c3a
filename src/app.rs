//! Main application orchestration and execution

use crate::{
    cli::{Cli, Command},
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, Result},
    logging::{Logger, LoggerFactory},
    measure::MeasurementAdapter,
    models::{Config, Measurement, MeasurementRecord},
    output::{JsonReport, OutputCoordinator, OutputFormatterFactory},
    store::LogStore,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command.
    ///
    /// Returns the process exit code. Errors already rendered on the
    /// dashboard map to a non-zero code instead of an `Err`.
    pub async fn run(self) -> Result<i32> {
        let command = self.cli.command();
        if command == Command::Env {
            println!("{}", EnvManager::display_env_help());
            println!();
            println!("{}", EnvManager::create_example_env_content());
            return Ok(0);
        }

        let config = load_config(self.cli.clone())?;
        let loggers = LoggerFactory::new(config.clone());
        let logger = loggers.create_logger("APP").await;

        logger
            .debug("Configuration loaded")
            .field("summary", display_config_summary(&config))
            .log()
            .await;
        for warning in EnvManager::validate_current_env() {
            logger.warn(&warning).log().await;
        }

        let identity = config.identity();
        logger.add_context_field("identity".to_string(), &identity).await;

        let session = Session {
            identity,
            store: LogStore::from_config(&config),
            coordinator: OutputCoordinator::new(OutputFormatterFactory::create_formatter(
                config.enable_color,
                config.verbose,
            )),
            json: self.cli.json,
            rows: config.history_rows,
            logger,
        };

        match command {
            Command::History => session.history().await,
            _ => session.run(&config, &loggers).await,
        }
    }
}

/// State shared by the `run` and `history` views
struct Session {
    identity: String,
    store: LogStore,
    coordinator: OutputCoordinator,
    json: bool,
    rows: usize,
    logger: Logger,
}

impl Session {
    async fn run(&self, config: &Config, loggers: &LoggerFactory) -> Result<i32> {
        let adapter = MeasurementAdapter::from_config(config, loggers).await?;
        let outcome = adapter.measure().await;

        let measurement = match outcome {
            Ok(measurement) => measurement,
            Err(e) => {
                // Nothing is persisted for a failed attempt
                loggers
                    .create_error_logger()
                    .log_error(&e, Some("speed test"), None)
                    .await;
                return match self.store.read_all(&self.identity) {
                    Ok(history) => {
                        self.render_run(Err(&e), &history)?;
                        Ok(e.exit_code())
                    }
                    Err(storage) => {
                        // The error panel is shown even when the history cannot be read
                        self.render_run(Err(&e), &[])?;
                        Err(storage)
                    }
                };
            }
        };

        let record = measurement.to_record_now();
        if let Err(e) = self.store.append(&self.identity, &record) {
            // The numbers are still worth showing even though they were not logged
            self.render_run(Ok(&measurement), &[])?;
            return Err(e);
        }
        self.logger
            .info("Measurement logged")
            .record(&record)
            .log()
            .await;

        let history = self.store.read_all(&self.identity)?;
        self.render_run(Ok(&measurement), &history)?;
        Ok(0)
    }

    async fn history(&self) -> Result<i32> {
        let history = self.store.read_all(&self.identity)?;
        self.logger
            .debug("History loaded")
            .field("records", history.len())
            .log()
            .await;

        let output = if self.json {
            JsonReport::history(&self.identity, &history, self.rows).to_json()?
        } else {
            self.coordinator.display_history(&self.identity, &history, self.rows)?
        };
        println!("{}", output);
        Ok(0)
    }

    fn render_run(
        &self,
        outcome: std::result::Result<&Measurement, &AppError>,
        history: &[MeasurementRecord],
    ) -> Result<()> {
        let output = if self.json {
            JsonReport::run(&self.identity, outcome, history, self.rows).to_json()?
        } else {
            self.coordinator
                .display_run(&self.identity, outcome, history, self.rows)?
        };
        println!("{}", output);
        Ok(())
    }
}

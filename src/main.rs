//! speedlog - personal internet speed test dashboard

use clap::Parser;
use speedlog::{app::App, cli::Cli, error::ErrorReporter, AppError};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);
        let error = AppError::validation(message);
        reporter.report_error(&error);
        process::exit(error.exit_code());
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);
    match App::new(cli).run().await {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            reporter.report_error(&e);
            process::exit(e.exit_code());
        }
    }
}

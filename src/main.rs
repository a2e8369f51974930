use buncli::config::Cli;
use buncli::{Config, ReturnCode};
use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ReturnCode::HelpPrinted,
                _ => ReturnCode::ArgumentError,
            };
            return code.into();
        }
    };

    buncli::logging::init(cli.verbose);

    // Convert CLI args to Config - this validates immediately
    let config = match Config::try_from(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return err.return_code().into();
        }
    };

    match buncli::commands::run(config).await {
        Ok(()) => ReturnCode::Success.into(),
        Err(err) if err.is_cancellation() => {
            eprintln!("Cancelled.");
            ReturnCode::Success.into()
        }
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{}", err);
            err.return_code().into()
        }
    }
}

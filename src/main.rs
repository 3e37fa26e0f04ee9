//! Bitget copy-trading relay.
//!
//! Fetches parent orders recorded by the copy-trading backend, places a
//! market-order copy of each on Bitget and reports the children back.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use bitget_copytrade::api::{BackendClient, BitgetClient};
use bitget_copytrade::bot::{Relay, RunOutcome};
use bitget_copytrade::config::{ConfigLoader, TerminalPrompter};
use bitget_copytrade::{logging, RelayError};

/// Copy-trading relay CLI.
#[derive(Parser)]
#[command(name = "copytrade")]
#[command(about = "Replay backend-recorded orders as Bitget futures market orders", long_about = None)]
struct Cli {
    /// Settings file path
    #[arg(short, long, env = "COPYTRADE_CONFIG", default_value = "config.ini")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Fail on missing settings instead of prompting for them
    #[arg(long)]
    non_interactive: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(kind = e.kind(), "Relay stopped");
            println!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode, RelayError> {
    let mut loader = ConfigLoader::from_sources(&cli.config)?;
    let config = if cli.non_interactive {
        loader.resolve()?
    } else {
        loader.resolve_interactive(&mut TerminalPrompter)?
    };

    let backend = BackendClient::new(&config.base_url)?;
    let connect_exchange = || -> Result<BitgetClient, RelayError> {
        let credentials = if cli.non_interactive {
            loader.exchange_credentials()?
        } else {
            loader.exchange_credentials_interactive(&mut TerminalPrompter)?
        };
        BitgetClient::new(credentials)
    };

    match Relay::new(&config, &backend).run(connect_exchange).await? {
        RunOutcome::NoNewOrders => {
            println!("Received no new orders to copy. Exiting.");
            Ok(ExitCode::FAILURE)
        }
        RunOutcome::Completed(report) => {
            println!("{}", report);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn failure_message(e: &RelayError) -> String {
    match e {
        RelayError::Auth(reason) => {
            format!("Failed to authenticate: {}\nAuthentication failed. Exiting.", reason)
        }
        RelayError::Backend(_) | RelayError::Transport(_) => {
            format!("Backend request failed: {}. Exiting.", e)
        }
        _ => format!("{} Exiting.", e),
    }
}

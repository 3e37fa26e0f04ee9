//! Creates a copy-trading backend account.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use bitget_copytrade::api::BackendClient;
use bitget_copytrade::config::{parse_base_url, Prompter, Secret, TerminalPrompter, DEFAULT_BASE_URL};
use bitget_copytrade::registration::register_account;
use bitget_copytrade::{logging, RelayError};

/// Backend account registration.
#[derive(Parser)]
#[command(name = "register")]
#[command(about = "Register a new copy-trading backend account", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(short, long, env = "COPYTRADE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
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
        Ok(()) => {
            println!("Registered successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = e.kind(), "Registration stopped");
            match e {
                RelayError::Auth(reason) => println!("Failed to register: {}", reason),
                other => println!("{} Exiting.", other),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), RelayError> {
    let base_url = parse_base_url(&cli.base_url)?;
    let mut prompter = TerminalPrompter;

    let email = prompter.ask("Please enter email:")?;
    let password = Secret::new(prompter.ask_secret("Please enter the password:")?);
    let confirmation = Secret::new(prompter.ask_secret("Please confirm the password:")?);

    let backend = BackendClient::new(&base_url)?;
    register_account(&backend, &email, &password, &confirmation).await?;
    Ok(())
}

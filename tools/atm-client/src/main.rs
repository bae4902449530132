//! Secure-Teller ATM terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use atm_client::{load_psk, parse_step, AtmClient, ClientError};
use clap::{Parser, Subcommand};
use shared_types::{AccountRequest, Amount, Identity};
use st_01_secure_channel::{SessionError, SessionLimits};
use teller_telemetry::{init_telemetry, TelemetryConfig};

/// Secure-Teller ATM client
#[derive(Parser, Debug)]
#[command(name = "atm-client", version)]
#[command(about = "Send authenticated, encrypted requests to a Secure-Teller server")]
struct Args {
    /// Identity to authenticate as
    #[arg(short, long)]
    identity: Identity,

    /// JSON key file holding the identity's pre-shared key
    #[arg(short, long, default_value = "server/user_keys.json")]
    key_file: PathBuf,

    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:65432")]
    addr: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deposit an amount
    Deposit { amount: Amount },
    /// Withdraw an amount
    Withdraw { amount: Amount },
    /// Show the current balance
    Balance,
    /// List this identity's audit entries
    ViewLog,
    /// Run several steps in one session, e.g. `deposit:100 balance`
    Script {
        #[arg(required = true, value_parser = parse_step)]
        steps: Vec<AccountRequest>,
    },
}

impl Command {
    fn into_requests(self) -> Vec<AccountRequest> {
        match self {
            Command::Deposit { amount } => vec![AccountRequest::deposit(amount)],
            Command::Withdraw { amount } => vec![AccountRequest::withdraw(amount)],
            Command::Balance => vec![AccountRequest::balance()],
            Command::ViewLog => vec![AccountRequest::view_log()],
            Command::Script { steps } => steps,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_component("atm-client");
    if std::env::var_os("ST_LOG_LEVEL").is_none() && std::env::var_os("RUST_LOG").is_none() {
        telemetry.log_level = "warn".to_string();
    }
    let _telemetry = init_telemetry(telemetry).context("Failed to initialize telemetry")?;

    let psk = load_psk(&args.key_file, &args.identity)?;
    let mut client = AtmClient::connect(&args.addr, args.identity, psk, &SessionLimits::default())
        .await
        .context("Could not open a session")?;

    for request in args.command.into_requests() {
        match client.request(&request).await {
            Ok(result) => println!("[Message from Server]: {result}"),
            Err(ClientError::Session(SessionError::IntegrityViolation)) => {
                eprintln!("{}", SessionError::IntegrityViolation);
                std::process::exit(2);
            }
            Err(e) => return Err(e).context(format!("Request '{}' failed", request.action)),
        }
    }
    Ok(())
}

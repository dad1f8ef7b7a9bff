//! Runs one RFQ end to end: create, wait for a quote, execute it.
//!
//! ```sh
//! CHECKER_API_KEY=... CHECKER_SECRET_KEY=... RUST_LOG=info cargo run
//! ```
//!
//! Optional environment variables:
//! - `CHECKER_HOST` (default: <https://api-staging.checker.finance>)
//!
//! Exits with status 2 when credentials are missing and 1 when any workflow stage fails.

use std::process::ExitCode;

use checker_rfq_client::auth::{API_KEY_VAR, Credentials, SECRET_KEY_VAR};
use checker_rfq_client::config::Config;
use checker_rfq_client::rfq::{Client, Workflow};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "please set {API_KEY_VAR} and {SECRET_KEY_VAR}");
            return ExitCode::from(2);
        }
    };

    let config = Config::from_env();
    info!(host = %config.host, "starting RFQ workflow");

    let client = match Client::new(&config, credentials) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "unable to build RFQ client");
            return ExitCode::FAILURE;
        }
    };

    match Workflow::new(&client, config.poll).run().await {
        Ok(outcome) => {
            info!(
                rfq = %outcome.rfq,
                quote_id = %outcome.quote.quote_id,
                response = %outcome.execution.body,
                "executed"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), error = %e, "RFQ workflow failed");
            ExitCode::FAILURE
        }
    }
}

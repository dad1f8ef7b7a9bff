//! Client for a signed request-for-quote (RFQ) API.
//!
//! The crate drives one RFQ from start to finish:
//!
//! 1. **Create** an RFQ (`POST {host}/api/v1/request-for-quotes`) and resolve the URL that
//!    identifies it.
//! 2. **Poll** `{rfq}/quotes` on a fixed interval until a quote shows up.
//! 3. **Execute** the first quote (`POST {rfq}/execute`).
//!
//! Every call is signed with an HMAC over `api_key:nonce:path`, see [`auth`].
//!
//! # Example
//!
//! ```rust,no_run
//! use checker_rfq_client::auth::Credentials;
//! use checker_rfq_client::config::Config;
//! use checker_rfq_client::rfq::{Client, Workflow};
//!
//! # async fn example() -> checker_rfq_client::Result<()> {
//! let credentials = Credentials::from_env()?;
//! let config = Config::default();
//!
//! let client = Client::new(&config, credentials)?;
//! let outcome = Workflow::new(&client, config.poll).run().await?;
//! println!("executed {}: {}", outcome.quote.quote_id, outcome.execution.body);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod rfq;

pub type Result<T> = std::result::Result<T, error::Error>;

/// Staging endpoint used when no host is configured.
pub const DEFAULT_HOST: &str = "https://api-staging.checker.finance";

/// Path of the RFQ collection, relative to the host.
pub const RFQ_PATH: &str = "/api/v1/request-for-quotes";

/// Optional environment override for [`DEFAULT_HOST`].
pub const HOST_VAR: &str = "CHECKER_HOST";

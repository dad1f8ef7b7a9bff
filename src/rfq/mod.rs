//! RFQ (Request for Quote) API client and workflow.
//!
//! # Overview
//!
//! - [`Client`] talks to the three endpoints: create, list quotes, execute.
//! - [`poll_quotes`] re-lists quotes on a fixed interval until one appears.
//! - [`Workflow`] chains create → poll → execute, taking the first quote offered.
//!
//! The list and execute paths are derived from the RFQ URL: its path, minus any trailing slash,
//! plus `/quotes` or `/execute`. Each request is signed over that derived path.
//!
//! # Example
//!
//! ```rust,no_run
//! use checker_rfq_client::auth::Credentials;
//! use checker_rfq_client::config::{Config, PollConfig};
//! use checker_rfq_client::rfq::{Client, RfqApi as _, poll_quotes};
//! use std::time::Duration;
//!
//! # async fn example() -> checker_rfq_client::Result<()> {
//! let config = Config::default();
//! let client = Client::new(&config, Credentials::from_env()?)?;
//!
//! let rfq = client.create_rfq().await?;
//! let poll = PollConfig::builder()
//!     .max_attempts(30)
//!     .delay(Duration::from_millis(500))
//!     .build();
//! let quote = poll_quotes(&client, &rfq, poll).await?;
//! let result = client.execute_quote(&rfq, &quote.quote_id).await?;
//! println!("{}", result.body);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod poller;
pub mod types;
pub mod workflow;

pub use client::{Client, RfqApi};
pub use poller::poll_quotes;
pub use workflow::{Workflow, WorkflowOutcome};

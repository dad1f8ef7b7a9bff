#![allow(
    dead_code,
    reason = "Each integration test binary uses a different subset of the helpers"
)]
#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests"
)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use checker_rfq_client::Result;
use checker_rfq_client::error::Error;
use checker_rfq_client::rfq::RfqApi;
use checker_rfq_client::rfq::types::{ExecutionResult, Quote, RfqHandle};
use reqwest::{Method, StatusCode};

pub const API_KEY: &str = "test-api-key";
pub const SECRET: &str = "test-secret";

pub const X_API_KEY: &str = "x-api-key";
pub const X_NONCE: &str = "x-nonce";
pub const X_SIGNATURE: &str = "x-signature";

/// One scripted answer of [`ScriptedApi::list_quotes`].
pub enum Listing {
    Quotes(Vec<Quote>),
    Status(u16, &'static str),
}

/// In-memory [`RfqApi`] that replays scripted listings and records every call.
pub struct ScriptedApi {
    rfq_url: String,
    listings: Mutex<VecDeque<Listing>>,
    execute_failure: Option<(u16, &'static str)>,
    pub creates: AtomicU32,
    pub lists: AtomicU32,
    pub executions: Mutex<Vec<(RfqHandle, String)>>,
}

impl ScriptedApi {
    pub fn new(rfq_url: &str, listings: Vec<Listing>) -> Self {
        Self {
            rfq_url: rfq_url.to_owned(),
            listings: Mutex::new(listings.into()),
            execute_failure: None,
            creates: AtomicU32::new(0),
            lists: AtomicU32::new(0),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Makes every execute call fail with `status` and `body`.
    pub fn failing_execute(mut self, status: u16, body: &'static str) -> Self {
        self.execute_failure = Some((status, body));
        self
    }

    pub fn list_calls(&self) -> u32 {
        self.lists.load(Ordering::SeqCst)
    }
}

fn status_error(status: u16, method: Method, path: &str, body: &str) -> Error {
    let status = StatusCode::from_u16(status).unwrap();
    Error::status(status, method, path.to_owned(), body)
}

#[async_trait]
impl RfqApi for ScriptedApi {
    async fn create_rfq(&self) -> Result<RfqHandle> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        RfqHandle::parse(&self.rfq_url)
    }

    async fn list_quotes(&self, rfq: &RfqHandle) -> Result<Vec<Quote>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let next = self.listings.lock().unwrap().pop_front();

        match next {
            Some(Listing::Quotes(quotes)) => Ok(quotes),
            Some(Listing::Status(status, body)) => Err(status_error(
                status,
                Method::GET,
                rfq.quotes_url().path(),
                body,
            )),
            None => Ok(Vec::new()),
        }
    }

    async fn execute_quote(&self, rfq: &RfqHandle, quote_id: &str) -> Result<ExecutionResult> {
        self.executions
            .lock()
            .unwrap()
            .push((rfq.clone(), quote_id.to_owned()));

        match self.execute_failure {
            Some((status, body)) => Err(status_error(
                status,
                Method::POST,
                rfq.execute_url().path(),
                body,
            )),
            None => Ok(ExecutionResult::new(format!(
                r#"{{"status":"executed","quoteId":"{quote_id}"}}"#
            ))),
        }
    }
}

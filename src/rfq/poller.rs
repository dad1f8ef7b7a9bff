//! Quote polling.

use tokio::time::sleep;
use tracing::info;

use crate::Result;
use crate::config::PollConfig;
use crate::error::Error;
use crate::rfq::client::RfqApi;
use crate::rfq::types::{Quote, RfqHandle};

/// Lists quotes for `rfq` until one shows up, then returns the first quote of that list.
///
/// At most `config.max_attempts` calls are made, and every empty list is followed by a
/// `config.delay` sleep. Only an empty list is retried: an error from [`RfqApi::list_quotes`] is
/// returned immediately.
///
/// # Errors
///
/// Returns a [`crate::error::Kind::PollTimeout`] error when every attempt came back empty, and a
/// [`crate::error::Kind::Validation`] error when `max_attempts` is zero.
pub async fn poll_quotes<A>(api: &A, rfq: &RfqHandle, config: PollConfig) -> Result<Quote>
where
    A: RfqApi + ?Sized,
{
    config.validate()?;

    for attempt in 1..=config.max_attempts {
        let quotes = api.list_quotes(rfq).await?;

        if let Some(quote) = quotes.into_iter().next() {
            info!(attempt, quote_id = %quote.quote_id, quote = ?quote.extra, "received quote");
            return Ok(quote);
        }

        info!(
            attempt,
            max_attempts = config.max_attempts,
            "no quotes yet"
        );
        sleep(config.delay).await;
    }

    Err(Error::poll_timeout(config.max_attempts, config.delay))
}

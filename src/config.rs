//! Client and workflow configuration.

use std::time::Duration;

use bon::Builder;
use url::Url;

use crate::error::Error;
use crate::rfq::types::CreateRfqRequest;
use crate::{DEFAULT_HOST, RFQ_PATH, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Connection and payload settings for [`crate::rfq::Client`].
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
#[builder(on(String, into))]
pub struct Config {
    /// Scheme and authority of the API. `rfq_path` replaces whatever path it carries.
    #[builder(default = DEFAULT_HOST.to_owned())]
    pub host: String,
    #[builder(default = RFQ_PATH.to_owned())]
    pub rfq_path: String,
    /// Per-request timeout. Expiry fails that single call with a transport error.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
    /// Rewrite `http://` RFQ URLs handed back by the server to `https://`.
    #[builder(default = true)]
    pub upgrade_insecure_urls: bool,
    #[builder(default)]
    pub poll: PollConfig,
    /// Body sent when creating the RFQ.
    #[builder(default)]
    pub request: CreateRfqRequest,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl Config {
    /// Default configuration with the host taken from [`crate::HOST_VAR`] when set.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(crate::HOST_VAR) {
            Ok(host) if !host.is_empty() => Config::builder().host(host).build(),
            _ => Config::default(),
        }
    }

    pub(crate) fn host_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.host)?)
    }

    pub(crate) fn create_url(&self) -> Result<Url> {
        if !self.rfq_path.starts_with('/') {
            return Err(Error::validation(format!(
                "rfq path must be absolute, got {}",
                self.rfq_path
            )));
        }

        let mut url = self.host_url()?;
        url.set_path(&self.rfq_path);
        Ok(url)
    }
}

/// How long to wait for quotes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
pub struct PollConfig {
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Sleep between two empty attempts.
    #[builder(default = DEFAULT_DELAY)]
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig::builder().build()
    }
}

impl PollConfig {
    pub(crate) fn validate(self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::validation("max_attempts must be at least 1"));
        }
        Ok(())
    }
}

//! RFQ response types

#![allow(
    clippy::module_name_repetitions,
    reason = "Response suffix is intentional for clarity"
)]

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::Result;

const QUOTES_SUFFIX: &str = "/quotes";
const EXECUTE_SUFFIX: &str = "/execute";

/// Handle of a created RFQ. The URL is its only identity.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfqHandle {
    pub url: Url,
}

impl RfqHandle {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// `GET` target for the quote list.
    #[must_use]
    pub fn quotes_url(&self) -> Url {
        self.endpoint(QUOTES_SUFFIX)
    }

    /// `POST` target for execution.
    #[must_use]
    pub fn execute_url(&self) -> Url {
        self.endpoint(EXECUTE_SUFFIX)
    }

    /// Keeps scheme and authority, drops query and fragment, and appends `suffix` to the path
    /// with any trailing slashes removed.
    fn endpoint(&self, suffix: &str) -> Url {
        let path = format!("{}{suffix}", self.url.path().trim_end_matches('/'));

        let mut url = self.url.clone();
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

impl fmt::Display for RfqHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}

/// Fields of the create response that may carry the RFQ URL, in priority order.
///
/// Values are kept as raw JSON so that a non-string field is skipped instead of failing the
/// whole response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateRfqResponse {
    #[serde(rename = "rfqUrl")]
    rfq_url_camel: Option<Value>,
    rfq_url: Option<Value>,
    url: Option<Value>,
}

impl CreateRfqResponse {
    /// Parses a create body. Anything that is not a JSON object yields no candidates.
    pub(crate) fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub(crate) fn candidates(&self) -> impl Iterator<Item = &str> {
        [&self.rfq_url_camel, &self.rfq_url, &self.url]
            .into_iter()
            .filter_map(|field| field.as_ref().and_then(Value::as_str))
            .filter(|value| !value.is_empty())
    }
}

/// A quote returned for an RFQ.
///
/// Only `quoteId` is interpreted; every other provider field is kept in `extra` untouched.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub quote_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quote {
    #[must_use]
    pub fn new<S: Into<String>>(quote_id: S) -> Self {
        Self {
            quote_id: quote_id.into(),
            extra: Map::new(),
        }
    }
}

/// Raw body returned by the execute endpoint; interpretation is left to the caller.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub body: String,
}

impl ExecutionResult {
    #[must_use]
    pub fn new(body: String) -> Self {
        Self { body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_ignore_trailing_slash() -> Result<()> {
        let plain = RfqHandle::parse("https://x.test/rfq/123")?;
        let slashed = RfqHandle::parse("https://x.test/rfq/123/")?;

        assert_eq!(plain.quotes_url(), slashed.quotes_url());
        assert_eq!(plain.execute_url(), slashed.execute_url());
        assert_eq!(plain.quotes_url().path(), "/rfq/123/quotes");
        assert_eq!(slashed.execute_url().path(), "/rfq/123/execute");
        Ok(())
    }

    #[test]
    fn derived_urls_keep_authority_and_drop_query() -> Result<()> {
        let handle = RfqHandle::parse("https://x.test:8443/api/v1/request-for-quotes/9//?a=1#f")?;

        assert_eq!(
            handle.execute_url().as_str(),
            "https://x.test:8443/api/v1/request-for-quotes/9/execute"
        );
        Ok(())
    }

    #[test]
    fn create_response_candidates_in_priority_order() {
        let response = CreateRfqResponse::from_body(
            r#"{"url":"https://c.test","rfq_url":"https://b.test","rfqUrl":"https://a.test"}"#,
        );

        let candidates: Vec<_> = response.candidates().collect();
        assert_eq!(candidates, ["https://a.test", "https://b.test", "https://c.test"]);
    }

    #[test]
    fn create_response_skips_empty_and_non_string_fields() {
        let response =
            CreateRfqResponse::from_body(r#"{"rfqUrl":"","rfq_url":42,"url":"https://c.test"}"#);

        assert_eq!(response.candidates().collect::<Vec<_>>(), ["https://c.test"]);
    }

    #[test]
    fn create_response_tolerates_non_object_bodies() {
        for body in ["", "not json", "[1,2]", "\"https://a.test\"", "null"] {
            let response = CreateRfqResponse::from_body(body);
            assert_eq!(response.candidates().count(), 0, "body {body:?}");
        }
    }

    #[test]
    fn deserialize_quote_keeps_provider_fields() {
        let json = r#"{
            "quoteId": "q1",
            "provider": "braza",
            "price": 5.4321,
            "expiresAt": "2026-10-19T12:00:00Z"
        }"#;
        let quote: Quote = serde_json::from_str(json).expect("deserialize should succeed");

        assert_eq!(quote.quote_id, "q1");
        assert_eq!(quote.extra.len(), 3);
        assert_eq!(quote.extra["provider"], "braza");
        assert!(!quote.extra.contains_key("quoteId"), "quoteId is not duplicated");
    }

    #[test]
    fn deserialize_quote_requires_quote_id() {
        let result = serde_json::from_str::<Quote>(r#"{"price": 1}"#);

        assert!(result.is_err(), "quote without quoteId must be rejected");
    }
}

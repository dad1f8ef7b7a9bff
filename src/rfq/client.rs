//! RFQ Client implementation
//!
//! Provides the [`Client`] for the three RFQ endpoints and the [`RfqApi`] trait the poller and
//! workflow are written against. Every request is signed over its own path.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, LOCATION};
use reqwest::{Client as ReqwestClient, Method, Response};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::Result;
use crate::auth::{API_KEY_HEADER, Credentials, SignedRequest, Signer, mask};
use crate::config::Config;
use crate::error::{Error, ExecutionDiagnostics, Status};
use crate::rfq::types::response::CreateRfqResponse;
use crate::rfq::types::{CreateRfqRequest, ExecuteQuoteRequest, ExecutionResult, Quote, RfqHandle};

/// The three RFQ operations.
#[async_trait]
pub trait RfqApi: Send + Sync {
    /// Creates an RFQ and returns the handle identifying it.
    async fn create_rfq(&self) -> Result<RfqHandle>;

    /// Lists the quotes currently offered for `rfq`. An empty list is not an error.
    async fn list_quotes(&self, rfq: &RfqHandle) -> Result<Vec<Quote>>;

    /// Executes `quote_id` against `rfq`, returning the raw response body.
    async fn execute_quote(&self, rfq: &RfqHandle, quote_id: &str) -> Result<ExecutionResult>;
}

/// Client for the RFQ API.
///
/// # Example
///
/// ```rust,no_run
/// use checker_rfq_client::auth::Credentials;
/// use checker_rfq_client::config::Config;
/// use checker_rfq_client::rfq::{Client, RfqApi as _};
/// use secrecy::SecretString;
///
/// # async fn example() -> checker_rfq_client::Result<()> {
/// let credentials = Credentials::new("api-key".to_owned(), SecretString::from("secret"));
/// let client = Client::new(&Config::default(), credentials)?;
///
/// let rfq = client.create_rfq().await?;
/// let quotes = client.list_quotes(&rfq).await?;
/// println!("{rfq}: {} quotes", quotes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    create_url: Url,
    signer: Signer,
    request: CreateRfqRequest,
    upgrade_insecure_urls: bool,
    http: ReqwestClient,
}

impl Client {
    /// Creates a new RFQ client.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client cannot be created.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", HeaderValue::from_static("checker_rfq_client"));
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));

        let http = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            create_url: config.create_url()?,
            signer: Signer::new(credentials),
            request: config.request.clone(),
            upgrade_insecure_urls: config.upgrade_insecure_urls,
            http,
        })
    }

    /// Returns the URL RFQs are created at.
    #[must_use]
    pub fn create_url(&self) -> &Url {
        &self.create_url
    }

    /// Signs `body` for `url`'s path and sends it.
    async fn send(&self, method: Method, url: Url, body: Option<String>) -> Result<Sent> {
        let signed = self.signer.sign_request(method, url.path(), body)?;
        let headers = signed.headers(self.signer.api_key())?;

        let mut builder = self.http.request(signed.method.clone(), url.clone());
        if let Some(body) = &signed.body {
            builder = builder.body(body.clone());
        }
        let mut request = builder.build()?;
        *request.headers_mut() = headers.clone();

        debug!(method = %signed.method, path = %signed.path, nonce = signed.nonce, "sending signed request");
        let response = self.http.execute(request).await?;

        Ok(Sent {
            url,
            signed,
            headers,
            response,
        })
    }

    /// Picks the RFQ URL out of a successful create response.
    ///
    /// Body fields win over the `Location` header. Relative values are resolved against the
    /// create URL; a value that does not resolve to a URL counts as missing.
    fn resolve_rfq_url(&self, body: &str, headers: &HeaderMap) -> Option<RfqHandle> {
        let fields = CreateRfqResponse::from_body(body);
        let location = headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty());
        let candidate = fields.candidates().next().or(location)?;

        let mut url = self.create_url.join(candidate).ok()?;
        if self.upgrade_insecure_urls && url.scheme() == "http" {
            url.set_scheme("https").ok()?;
        }

        Some(RfqHandle::new(url))
    }
}

#[async_trait]
impl RfqApi for Client {
    async fn create_rfq(&self) -> Result<RfqHandle> {
        let body = serde_json::to_string(&self.request)?;
        let Sent {
            signed, response, ..
        } = self
            .send(Method::POST, self.create_url.clone(), Some(body))
            .await?;

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::status(status, signed.method, signed.path, message));
        }

        let text = response.text().await?;
        let Some(rfq) = self.resolve_rfq_url(&text, &headers) else {
            return Err(Error::missing_rfq_url(status, text, headers));
        };

        info!(rfq = %rfq, "created RFQ");
        Ok(rfq)
    }

    async fn list_quotes(&self, rfq: &RfqHandle) -> Result<Vec<Quote>> {
        let Sent {
            signed, response, ..
        } = self.send(Method::GET, rfq.quotes_url(), None).await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::status(status, signed.method, signed.path, message));
        }

        let entries = response.json::<Option<Vec<Value>>>().await?;
        quotes_from_entries(entries.unwrap_or_default())
    }

    async fn execute_quote(&self, rfq: &RfqHandle, quote_id: &str) -> Result<ExecutionResult> {
        let payload = ExecuteQuoteRequest::builder()
            .winning_quote_id(quote_id)
            .build();
        let body = serde_json::to_string(&payload)?;
        let url = rfq.execute_url();
        info!(payload = %body, path = url.path(), "sending execute payload");

        let sent = self.send(Method::POST, url, Some(body)).await?;
        let status = sent.response.status();

        if !status.is_success() {
            return Err(sent.into_execute_error().await);
        }

        let text = sent.response.text().await?;
        info!(response = %text, "execution response");
        Ok(ExecutionResult::new(text))
    }
}

/// A request on the wire together with what it was signed with.
struct Sent {
    url: Url,
    signed: SignedRequest,
    headers: HeaderMap,
    response: Response,
}

impl Sent {
    /// Builds the `Status` error for a failed execute, with the full request/response snapshot.
    async fn into_execute_error(self) -> Error {
        let status_code = self.response.status();
        let response_headers = header_pairs(self.response.headers(), |_| true);
        let response_body = self.response.text().await.unwrap_or_default();

        let request_headers = header_pairs(&self.headers, |name| {
            name.starts_with("x-") || name == CONTENT_TYPE.as_str() || name == ACCEPT.as_str()
        })
        .into_iter()
        .map(|(name, value)| {
            if name == API_KEY_HEADER {
                let masked = mask(&value);
                (name, masked)
            } else {
                (name, value)
            }
        })
        .collect();

        let diagnostics = ExecutionDiagnostics {
            status_code,
            url: self.url.to_string(),
            method: self.signed.method.clone(),
            signed_path: self.signed.path.clone(),
            request_headers,
            request_body: self.signed.body.clone().unwrap_or_default(),
            response_headers,
            response_body: response_body.clone(),
        };

        Status {
            status_code,
            method: self.signed.method,
            path: self.signed.path,
            message: response_body,
            diagnostics: Some(Box::new(diagnostics)),
        }
        .into()
    }
}

/// Only the leading entry has to be a well-formed quote. Later entries that do not parse are
/// dropped, so the order of the server's list is kept for the entries that remain.
fn quotes_from_entries(entries: Vec<Value>) -> Result<Vec<Quote>> {
    let mut entries = entries.into_iter();
    let Some(first) = entries.next() else {
        return Ok(Vec::new());
    };

    let mut quotes = vec![serde_json::from_value::<Quote>(first)?];
    quotes.extend(entries.filter_map(|entry| serde_json::from_value(entry).ok()));
    Ok(quotes)
}

fn header_pairs<F>(headers: &HeaderMap, keep: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> bool,
{
    headers
        .iter()
        .filter(|(name, _)| keep(name.as_str()))
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(upgrade: bool) -> Client {
        let config = Config::builder()
            .host("https://api.test")
            .upgrade_insecure_urls(upgrade)
            .build();
        let credentials = Credentials::new("key".to_owned(), SecretString::from("secret"));
        Client::new(&config, credentials).expect("client")
    }

    fn location(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, value.parse().expect("header"));
        headers
    }

    #[test]
    fn insecure_body_url_is_upgraded() {
        let rfq = client(true)
            .resolve_rfq_url(r#"{"rfqUrl":"http://x.test/rfq/1"}"#, &HeaderMap::new())
            .expect("rfq url");

        assert_eq!(rfq.url.as_str(), "https://x.test/rfq/1");
    }

    #[test]
    fn other_schemes_pass_through() {
        let client = client(true);

        for url in ["https://x.test/rfq/1", "wss://x.test/rfq/1", "ftp://x.test/rfq/1"] {
            let body = format!(r#"{{"url":"{url}"}}"#);
            let rfq = client
                .resolve_rfq_url(&body, &HeaderMap::new())
                .expect("rfq url");
            assert_eq!(rfq.url.as_str(), url);
        }
    }

    #[test]
    fn upgrade_can_be_disabled() {
        let rfq = client(false)
            .resolve_rfq_url(r#"{"rfqUrl":"http://x.test/rfq/1"}"#, &HeaderMap::new())
            .expect("rfq url");

        assert_eq!(rfq.url.scheme(), "http");
    }

    #[test]
    fn body_fields_win_over_location() {
        let rfq = client(true)
            .resolve_rfq_url(
                r#"{"rfq_url":"https://body.test/rfq/1"}"#,
                &location("https://header.test/rfq/2"),
            )
            .expect("rfq url");

        assert_eq!(rfq.url.host_str(), Some("body.test"));
    }

    #[test]
    fn location_header_is_the_fallback() {
        let client = client(true);

        let absolute = client
            .resolve_rfq_url("not json", &location("http://header.test/rfq/2"))
            .expect("absolute location");
        assert_eq!(absolute.url.as_str(), "https://header.test/rfq/2");

        let relative = client
            .resolve_rfq_url("{}", &location("/api/v1/request-for-quotes/7"))
            .expect("relative location");
        assert_eq!(
            relative.url.as_str(),
            "https://api.test/api/v1/request-for-quotes/7"
        );
    }

    #[test]
    fn nothing_usable_yields_none() {
        let client = client(true);

        assert!(client.resolve_rfq_url("{}", &HeaderMap::new()).is_none());
        assert!(
            client
                .resolve_rfq_url(r#"{"rfqUrl":"http://[::1"}"#, &HeaderMap::new())
                .is_none(),
            "unparsable URL counts as missing"
        );
    }

    #[test]
    fn only_the_leading_entry_must_be_a_quote() -> Result<()> {
        let entries = vec![
            serde_json::json!({ "quoteId": "q1" }),
            serde_json::json!({ "id": "other-provider-shape" }),
            serde_json::json!({ "quoteId": "q3", "price": 5.1 }),
        ];

        let quotes = quotes_from_entries(entries)?;

        let ids: Vec<_> = quotes.iter().map(|quote| quote.quote_id.as_str()).collect();
        assert_eq!(ids, ["q1", "q3"]);
        Ok(())
    }

    #[test]
    fn malformed_leading_entry_is_an_error() {
        let entries = vec![
            serde_json::json!({ "id": "x" }),
            serde_json::json!({ "quoteId": "q2" }),
        ];

        let err = quotes_from_entries(entries).expect_err("leading entry lacks quoteId");

        assert_eq!(err.kind(), crate::error::Kind::Internal);
    }

    #[test]
    fn header_pairs_filters_by_name() {
        let mut headers = HeaderMap::new();
        headers.insert("x-nonce", HeaderValue::from_static("1"));
        headers.insert("user-agent", HeaderValue::from_static("ua"));

        let pairs = header_pairs(&headers, |name| name.starts_with("x-"));
        assert_eq!(pairs, vec![("x-nonce".to_owned(), "1".to_owned())]);
    }
}

//! Crate-wide error type.
//!
//! Every fallible operation returns [`crate::Result`]. The [`Kind`] tells the caller which stage
//! of the workflow failed; the typed payload behind it ([`Status`], [`MissingRfqUrl`],
//! [`PollTimeout`], [`MissingVar`]) can be recovered with [`Error::downcast_ref`].

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

/// Broad category of an [`Error`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Required configuration (credentials) is missing or unusable. Fatal at startup.
    Config,
    /// The server answered with a non-2xx status.
    Status,
    /// RFQ creation succeeded but no usable RFQ URL was found in the body or headers.
    MissingRfqUrl,
    /// The quote list stayed empty for the whole attempt budget.
    PollTimeout,
    /// Caller supplied an invalid argument.
    Validation,
    /// Transport, encoding or decoding failure.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns the typed payload of this error, if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

    pub fn missing_var(name: &'static str) -> Self {
        MissingVar { name }.into()
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Status {
            status_code,
            method,
            path,
            message: message.into(),
            diagnostics: None,
        }
        .into()
    }

    pub fn missing_rfq_url(status_code: StatusCode, body: String, headers: HeaderMap) -> Self {
        MissingRfqUrl {
            status_code,
            body,
            headers,
        }
        .into()
    }

    pub fn poll_timeout(attempts: u32, delay: Duration) -> Self {
        PollTimeout { attempts, delay }.into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Non-2xx response from the RFQ API.
#[non_exhaustive]
#[derive(Debug)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    /// Response body, verbatim.
    pub message: String,
    /// Full request/response snapshot, attached by the execute call only.
    pub diagnostics: Option<Box<ExecutionDiagnostics>>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

/// Snapshot of a failed execute call.
///
/// Outgoing headers only contain the `x-*` auth headers and the content negotiation headers; the
/// API key value is masked.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct ExecutionDiagnostics {
    pub status_code: StatusCode,
    pub url: String,
    pub method: Method,
    pub signed_path: String,
    pub request_headers: Vec<(String, String)>,
    pub request_body: String,
    pub response_headers: Vec<(String, String)>,
    pub response_body: String,
}

impl fmt::Display for ExecutionDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---- EXECUTE ERROR ----")?;
        writeln!(f, "Status code: {}", self.status_code.as_u16())?;
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Method: {}", self.method)?;
        writeln!(f, "Path used for signature: {}", self.signed_path)?;
        writeln!(f, "Request headers: {:?}", self.request_headers)?;
        writeln!(f, "Request body: {}", self.request_body)?;
        writeln!(f, "Response headers: {:?}", self.response_headers)?;
        writeln!(f, "Response body: {}", self.response_body)?;
        write!(f, "-----------------------")
    }
}

/// RFQ creation returned 2xx but none of `rfqUrl`, `rfq_url`, `url` or `Location` held a usable
/// URL.
#[non_exhaustive]
#[derive(Debug)]
pub struct MissingRfqUrl {
    pub status_code: StatusCode,
    pub body: String,
    pub headers: HeaderMap,
}

impl fmt::Display for MissingRfqUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not determine RFQ URL from response: status={}, body={}, headers={:?}",
            self.status_code, self.body, self.headers
        )
    }
}

impl StdError for MissingRfqUrl {}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimeout {
    pub attempts: u32,
    pub delay: Duration,
}

impl fmt::Display for PollTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no quotes received within polling limit ({} attempts, {:?} apart)",
            self.attempts, self.delay
        )
    }
}

impl StdError for PollTimeout {}

/// A required environment variable is unset or empty.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVar {
    pub name: &'static str,
}

impl fmt::Display for MissingVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "environment variable {} must be set", self.name)
    }
}

impl StdError for MissingVar {}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

impl From<Status> for Error {
    fn from(err: Status) -> Self {
        Error::with_source(Kind::Status, err)
    }
}

impl From<MissingRfqUrl> for Error {
    fn from(err: MissingRfqUrl) -> Self {
        Error::with_source(Kind::MissingRfqUrl, err)
    }
}

impl From<PollTimeout> for Error {
    fn from(err: PollTimeout) -> Self {
        Error::with_source(Kind::PollTimeout, err)
    }
}

impl From<MissingVar> for Error {
    fn from(err: MissingVar) -> Self {
        Error::with_source(Kind::Config, err)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

//! Request signing.
//!
//! Every call to the RFQ API carries three auth headers:
//!
//! | Header        | Value                                                          |
//! |---------------|----------------------------------------------------------------|
//! | `x-api-key`   | the API key                                                    |
//! | `x-nonce`     | milliseconds since the epoch, strictly increasing per process  |
//! | `x-signature` | `base64(HMAC-SHA256(secret, "{api_key}:{nonce}:{path}"))`      |
//!
//! The signed `path` is the URL path of the request only (no scheme, host or query) and is used
//! as-is, without escaping.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac as _};
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret as _, SecretString};
use sha2::Sha256;

use crate::Result;
use crate::error::Error;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const NONCE_HEADER: &str = "x-nonce";
pub const SIGNATURE_HEADER: &str = "x-signature";

pub const API_KEY_VAR: &str = "CHECKER_API_KEY";
pub const SECRET_KEY_VAR: &str = "CHECKER_SECRET_KEY";

const JSON: &str = "application/json";

/// API key and shared secret. The secret is never printed, not even by `Debug`.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_key: String,
    pub secret: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(api_key: String, secret: SecretString) -> Self {
        Self { api_key, secret }
    }

    /// Reads [`API_KEY_VAR`] and [`SECRET_KEY_VAR`] from the environment.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Config`] error if either variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::missing_var(name))
        };

        let api_key = read(API_KEY_VAR)?;
        let secret = read(SECRET_KEY_VAR)?;

        Ok(Self::new(api_key, SecretString::from(secret)))
    }
}

/// Computes `base64(HMAC-SHA256(secret, "{api_key}:{nonce}:{path}"))`.
pub fn sign(path: &str, nonce: i64, api_key: &str, secret: &SecretString) -> Result<String> {
    let message = format!("{api_key}:{nonce}:{path}");

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| Error::validation(format!("unusable secret key: {e}")))?;
    mac.update(message.as_bytes());

    let result = mac.finalize().into_bytes();
    Ok(STANDARD.encode(result))
}

/// Hands out millisecond timestamps that never repeat and never go backwards, even when two
/// requests are signed within the same millisecond or the wall clock steps back.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicI64,
}

impl NonceSource {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

/// Everything that went into signing one HTTP call.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct SignedRequest {
    pub method: Method,
    pub path: String,
    pub nonce: i64,
    pub signature: String,
    pub body: Option<String>,
}

impl SignedRequest {
    /// Renders the full header set for this request.
    pub fn headers(&self, api_key: &str) -> Result<HeaderMap> {
        auth_headers(api_key, self.nonce, &self.signature)
    }
}

fn auth_headers(api_key: &str, nonce: i64, signature: &str) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    map.insert(API_KEY_HEADER, api_key.parse()?);
    map.insert(NONCE_HEADER, nonce.to_string().parse()?);
    map.insert(SIGNATURE_HEADER, signature.parse()?);
    map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    map.insert(ACCEPT, HeaderValue::from_static(JSON));

    Ok(map)
}

/// Signs requests with one set of credentials, drawing a fresh nonce for every call.
pub struct Signer {
    credentials: Credentials,
    nonces: NonceSource,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("api_key", &mask(&self.credentials.api_key))
            .finish_non_exhaustive()
    }
}

impl Signer {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            nonces: NonceSource::new(),
        }
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.credentials.api_key
    }

    pub fn sign_request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<SignedRequest> {
        let nonce = self.nonces.next();
        let signature = sign(
            path,
            nonce,
            &self.credentials.api_key,
            &self.credentials.secret,
        )?;

        Ok(SignedRequest {
            method,
            path: path.to_owned(),
            nonce,
            signature,
            body,
        })
    }

    /// Signs `path` with a fresh nonce and returns the headers to send with it.
    pub fn create_headers(&self, path: &str) -> Result<HeaderMap> {
        let api_key = &self.credentials.api_key;
        let nonce = self.nonces.next();
        let signature = sign(path, nonce, api_key, &self.credentials.secret)?;

        auth_headers(api_key, nonce, &signature)
    }
}

/// Nonces for [`create_headers`], shared by every caller in the process.
static NONCES: NonceSource = NonceSource::new();

/// Builds the auth header set for a single request from raw credentials.
///
/// Nonces come from one process-wide [`NonceSource`], so two calls never share a nonce.
pub fn create_headers(path: &str, api_key: &str, secret: &SecretString) -> Result<HeaderMap> {
    let nonce = NONCES.next();
    let signature = sign(path, nonce, api_key, secret)?;

    auth_headers(api_key, nonce, &signature)
}

/// Keeps only the last four characters of a credential for display.
#[must_use]
pub fn mask(value: &str) -> String {
    let count = value.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }

    let tail: String = value.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}

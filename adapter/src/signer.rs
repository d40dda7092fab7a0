//! HMAC-SHA256 request signing of the Search Ad API.
//!
//! Every request carries a signature over the canonical message
//! `{timestamp}.{METHOD}.{path}`, keyed with the secret key of the account and
//! encoded as base64. The remote verifies the signature against the literal
//! request line and rejects stale timestamps, so a [`Timestamp`] must be taken
//! right before every request and never re-used.
use std::fmt;

use chrono::Utc;
use parse_display::{Display, FromStr};
use ring::hmac;

use crate::{Credentials, Error};

pub const X_API_KEY: &str = "X-API-KEY";
pub const X_CUSTOMER: &str = "X-CUSTOMER";
pub const X_TIMESTAMP: &str = "X-TIMESTAMP";
pub const X_SIGNATURE: &str = "X-SIGNATURE";

/// Milliseconds since the Unix epoch, transmitted as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The HTTP methods used with the API, they are always signed in upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr)]
#[display(style = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// A base64 encoded HMAC-SHA256.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signs the canonical message `{timestamp}.{method}.{path}` with the `secret`.
///
/// The `path` has to be exactly the path (and the query string, if the endpoint
/// verifies it) which will be transmitted, no normalization is applied.
///
/// # Errors
///
/// A configuration [`Error`] if the `secret` is empty.
///
/// ```
/// use adapter::{sign, Method, Timestamp};
///
/// let timestamp = Timestamp::from_millis(1_700_000_000_000);
/// let first = sign(timestamp, Method::Get, "/ncc/campaigns", b"secret").expect("Should sign");
/// let second = sign(timestamp, Method::Get, "/ncc/campaigns", b"secret").expect("Should sign");
///
/// assert_eq!(first, second);
/// ```
pub fn sign(
    timestamp: Timestamp,
    method: Method,
    path: &str,
    secret: &[u8],
) -> Result<Signature, Error> {
    if secret.is_empty() {
        return Err(Error::configuration("secret key is empty"));
    }

    let message = format!("{}.{}.{}", timestamp, method, path);

    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let tag = hmac::sign(&key, message.as_bytes());

    Ok(Signature(base64::encode(tag.as_ref())))
}

/// The authentication headers of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub api_key: String,
    pub customer_id: String,
    /// The exact timestamp used for the `signature`
    pub timestamp: Timestamp,
    pub signature: Signature,
}

impl SignedHeaders {
    /// The header names and values, in the order they are sent.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        [
            (X_API_KEY, self.api_key.clone()),
            (X_CUSTOMER, self.customer_id.clone()),
            (X_TIMESTAMP, self.timestamp.to_string()),
            (X_SIGNATURE, self.signature.to_string()),
        ]
        .into_iter()
    }
}

/// Signs requests on behalf of one account.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Signs a request which is about to be sent, using the current time.
    pub fn sign_request(&self, method: Method, path: &str) -> Result<SignedHeaders, Error> {
        self.sign_request_at(Timestamp::now(), method, path)
    }

    pub fn sign_request_at(
        &self,
        timestamp: Timestamp,
        method: Method,
        path: &str,
    ) -> Result<SignedHeaders, Error> {
        let signature = sign(timestamp, method, path, self.credentials.secret_key())?;

        Ok(SignedHeaders {
            api_key: self.credentials.api_key().to_string(),
            customer_id: self.credentials.customer_id().to_string(),
            timestamp,
            signature,
        })
    }
}

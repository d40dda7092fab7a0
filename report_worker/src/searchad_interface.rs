//! The signed HTTP client of the Search Ad API.
//!
//! Every request is signed right before it is sent, with a fresh [`Timestamp`],
//! and carries the `X-API-KEY`, `X-CUSTOMER`, `X-TIMESTAMP` & `X-SIGNATURE` headers.
use std::time::Duration;

use adapter::{Credentials, Method, Signer, Timestamp};
use primitives::{
    profile::{CampaignsProfile, ReportProfile, SignatureScope, StatsProfile},
    stats::extract_rows,
    util::ApiUrl,
    Campaign, Config, JobId, Period, StatRow,
};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode, Url};
use serde_json::Value;
use slog::{debug, Logger};
use thiserror::Error;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Building client: {0}")]
    BuildingClient(#[source] reqwest::Error),
    #[error("Request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Responded with {status}: {body}")]
    Status { status: StatusCode, body: Value },
    /// `body` is the undecodable payload, as text when it isn't JSON.
    #[error("Decoding response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: Value,
    },
    #[error("Signing request: {0}")]
    Signing(#[from] adapter::Error),
    #[error("Endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Whether retrying the same request later might succeed:
    /// transport errors & timeouts, `5xx` & `429` responses and undecodable bodies.
    /// A request which could not even be built is never retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Request(err) => {
                !err.is_builder()
                    && (err.is_timeout() || err.is_connect() || err.is_request() || err.is_body())
            }
            Error::Decode { .. } => true,
            Error::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Error::BuildingClient(_) | Error::Signing(_) | Error::Url(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
/// The `SearchAdApi` is cheap to clone
pub struct SearchAdApi {
    base_url: ApiUrl,
    client: Client,
    signer: Signer,
    pub logger: Logger,
}

impl SearchAdApi {
    /// Sets the [`reqwest::Client`]'s timeout for all the requests to `fetch_timeout`.
    pub fn new(
        base_url: ApiUrl,
        credentials: Credentials,
        fetch_timeout: Duration,
        logger: Logger,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(Error::BuildingClient)?;

        Ok(Self {
            base_url,
            client,
            signer: Signer::new(credentials),
            logger,
        })
    }

    pub fn from_config(
        config: &Config,
        credentials: Credentials,
        logger: Logger,
    ) -> Result<Self, Error> {
        Self::new(
            config.base_url.clone(),
            credentials,
            config.fetch_timeout,
            logger,
        )
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    pub fn customer_id(&self) -> &str {
        self.signer.credentials().customer_id()
    }

    /// Builds the full [`Url`] of the endpoint.
    ///
    /// The query is serialized once, with the `application/x-www-form-urlencoded` rules,
    /// so the signed query string is exactly the transmitted one.
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(path)?;

        if !query.is_empty() {
            let query_string = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.set_query(Some(&query_string));
        }

        Ok(url)
    }

    pub async fn get_signed(
        &self,
        path: &str,
        query: &[(&str, String)],
        scope: SignatureScope,
    ) -> Result<Value, Error> {
        let url = self.endpoint(path, query)?;

        self.send(Method::Get, url, None, scope).await
    }

    pub async fn post_signed(
        &self,
        path: &str,
        body: &Value,
        scope: SignatureScope,
    ) -> Result<Value, Error> {
        let url = self.endpoint(path, &[])?;

        self.send(Method::Post, url, Some(body), scope).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        scope: SignatureScope,
    ) -> Result<Value, Error> {
        let signed_path = signed_path(&url, scope);
        // never re-use a timestamp, the remote rejects stale signatures
        let timestamp = Timestamp::now();
        let headers = self
            .signer
            .sign_request_at(timestamp, method, &signed_path)?;

        let request_method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut request = self
            .client
            .request(request_method, url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(&self.logger, "Search Ad API request"; "method" => %method, "path" => &signed_path, "status" => status.as_u16(), "timestamp" => %timestamp);

        if !status.is_success() {
            return Err(Error::Status {
                status,
                body: raw_body(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
            source,
            body: raw_body(&bytes),
        })
    }

    /// `GET /ncc/campaigns`
    pub async fn campaigns(&self, profile: &CampaignsProfile) -> Result<Vec<Campaign>, Error> {
        let campaigns = self
            .get_signed(&profile.path, &[], profile.signature)
            .await?;

        serde_json::from_value(campaigns.clone()).map_err(|source| Error::Decode {
            source,
            body: campaigns,
        })
    }

    /// `GET /stats?ids=...&fields=[...]&timeRange={since,until}`
    ///
    /// The rows are extracted according to the [`StatsShape`](primitives::profile::StatsShape)
    /// of the profile.
    pub async fn stats(
        &self,
        ids: &[&str],
        period: &Period,
        profile: &StatsProfile,
    ) -> Result<Vec<StatRow>, Error> {
        let fields = Value::Array(profile.fields.iter().cloned().map(Value::String).collect());
        let query = [
            ("ids", ids.join(",")),
            ("fields", fields.to_string()),
            ("timeRange", period.time_range().to_string()),
        ];

        let response = self
            .get_signed(&profile.path, &query, profile.signature)
            .await?;

        Ok(extract_rows(profile.shape, &response))
    }

    /// `POST {jobs_path}` with the rendered body, returns the raw job resource.
    pub async fn create_report_job(
        &self,
        profile: &ReportProfile,
        body: &Value,
    ) -> Result<Value, Error> {
        self.post_signed(&profile.jobs_path, body, profile.signature)
            .await
    }

    /// `GET {jobs_path}/{id}`, returns the raw job resource.
    pub async fn get_report_job(
        &self,
        profile: &ReportProfile,
        job_id: &JobId,
    ) -> Result<Value, Error> {
        self.get_signed(&profile.job_path(job_id), &[], profile.signature)
            .await
    }
}

/// The part of the request line covered by the signature.
pub fn signed_path(url: &Url, scope: SignatureScope) -> String {
    match (scope, url.query()) {
        (SignatureScope::PathAndQuery, Some(query)) => format!("{}?{}", url.path(), query),
        _ => url.path().to_string(),
    }
}

/// Keeps the raw error payload of the remote for diagnostics.
fn raw_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// `url::Url::scheme()` returns lower-cased ASCII string without `:`
const SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid scheme '{0}', only 'http' & 'https' are allowed")]
    InvalidScheme(String),
    #[error("The Url has to be a base, i.e. `data:`, `mailto:` etc. are not allowed")]
    ShouldBeABase,
    #[error("Having a fragment (i.e. `#fragment`) is not allowed")]
    HasFragment,
    #[error("Having a query parameters (i.e. `?query_param=value`) is not allowed")]
    HasQuery,
    #[error("Parsing the url: {0}")]
    Parsing(#[from] url::ParseError),
}

/// The base Url of the Search Ad API (or of a mock of it).
///
/// It always ends with `/`, so endpoints can be joined to it
/// without dropping a path prefix, and it's guaranteed to have:
/// - `http` or `https` scheme
/// - no `#fragment`
/// - no `?query`
#[derive(Clone, Hash, Eq, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Url", into = "Url")]
pub struct ApiUrl(Url);

impl ApiUrl {
    pub fn parse(input: &str) -> Result<Self, Error> {
        Self::from_str(input)
    }

    /// Joins an endpoint path, e.g. `/master-reports/job-1`, to the base Url.
    /// The leading `/` of the endpoint is stripped, so the path prefix of the base Url is kept.
    pub fn join(&self, endpoint: &str) -> Result<Url, url::ParseError> {
        let stripped = endpoint.strip_prefix('/').unwrap_or(endpoint);
        // this join is safe, since we always suffix the Url with `/`
        self.0.join(stripped)
    }

    pub fn to_url(&self) -> Url {
        self.0.clone()
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Url({})", self)
    }
}

impl TryFrom<Url> for ApiUrl {
    type Error = Error;

    fn try_from(mut url: Url) -> Result<Self, Self::Error> {
        if url.cannot_be_a_base() {
            return Err(Error::ShouldBeABase);
        }

        if url.fragment().is_some() {
            return Err(Error::HasFragment);
        }

        if !SCHEMES.contains(&url.scheme()) {
            return Err(Error::InvalidScheme(url.scheme().to_string()));
        }

        if url.query().is_some() {
            return Err(Error::HasQuery);
        }

        let mut path = url.path().trim_end_matches('/').to_string();
        path.push('/');
        url.set_path(&path);

        Ok(Self(url))
    }
}

impl From<ApiUrl> for Url {
    fn from(api_url: ApiUrl) -> Self {
        api_url.0
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.parse::<Url>()?)
    }
}

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("tfidf-client/", env!("CARGO_PKG_VERSION"));

/// The service endpoints this client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Index,
    ViewIndex,
    Search,
}

impl Endpoint {
    /// Path relative to the configured base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Health => "",
            Self::Index => "index/",
            Self::ViewIndex => "view-index/",
            Self::Search => "search/",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Health => write!(f, "GET /"),
            Self::Index => write!(f, "POST /index/"),
            Self::ViewIndex => write!(f, "GET /view-index/"),
            Self::Search => write!(f, "POST /search/"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Always ends in `/` so endpoint paths join below it.
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim();
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        let base_url = Url::parse(&with_slash)
            .map_err(|e| ClientError::Config(format!("base url {trimmed:?}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base url {trimmed:?} must use http or https"
            )));
        }
        Ok(Self { base_url, timeout: DEFAULT_TIMEOUT, user_agent: DEFAULT_USER_AGENT.to_string() })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, ClientError> {
        self.base_url
            .join(endpoint.path())
            .map_err(|e| ClientError::Config(format!("cannot resolve {endpoint}: {e}")))
    }
}

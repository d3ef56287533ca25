use serde::{Deserialize, Serialize};

/// the only artifact the whole pipeline exists to produce. `headers` must
/// accompany every request the caller makes to `url`, and the auth tokens
/// behind it are time-limited, so use it promptly
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedStream {
    pub url: String,
    pub headers: StreamHeaders,
}

// the edge checks all four of these, serialized under their wire names
#[derive(Debug, Clone, Serialize)]
pub struct StreamHeaders {
    #[serde(rename = "Referer")]
    pub referer: String,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "User-Agent")]
    pub user_agent: String,
    #[serde(rename = "Connection")]
    pub connection: String,
}

/// shape of the assignment endpoint's answer. the endpoint changes shape
/// without notice, so everything is optional and absence degrades to an
/// empty key downstream
#[derive(Debug, Clone, Deserialize)]
pub struct ServerLookupResponse {
    #[serde(default)]
    pub server_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

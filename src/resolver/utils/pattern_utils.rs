use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::BUNDLE_VAR_CANDIDATES;

/// every assumption about the target's page layout lives here as one named
/// extractor, so a layout change means swapping one pattern and nothing else.
/// all of them take the first occurrence, matching how the pages are built
static IFRAME_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"iframe src="([^"]*)"#).expect("iframe pattern should compile"));

static PLAYER_TWO_DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-url="([^"]+)"\s+title="PLAYER 2""#)
        .expect("player link pattern should compile")
});

static CHANNEL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"const\s+CHANNEL_KEY\s*=\s*"([^"]+)""#)
        .expect("channel key pattern should compile")
});

static BUNDLE_VAR: Lazy<Regex> = Lazy::new(|| {
    let names = BUNDLE_VAR_CANDIDATES.join("|");
    Regex::new(&format!(r#"const\s+({names})\s*=\s*"([^"]+)""#))
        .expect("bundle pattern should compile")
});

static HOST_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"host\s*=\s*\[([^\]]+)\]").expect("host array pattern should compile"));

static FETCH_WITH_RETRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"fetchWithRetry\(\s*'([^']*)").expect("lookup call pattern should compile")
});

static API_FETCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"fetch\(\s*['"]([^'"]*/api/[^'"]*)"#).expect("api fetch pattern should compile")
});

pub fn first_iframe_src(html: &str) -> Option<&str> {
    IFRAME_SRC
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn player_two_data_url(html: &str) -> Option<&str> {
    PLAYER_TWO_DATA_URL
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn channel_key(html: &str) -> Option<&str> {
    CHANNEL_KEY
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// returns (variable name, encoded payload). the name rotates, see
/// `BUNDLE_VAR_CANDIDATES`
pub fn bundle_payload(html: &str) -> Option<(&str, &str)> {
    BUNDLE_VAR.captures(html).and_then(|c| {
        match (c.get(1), c.get(2)) {
            (Some(name), Some(payload)) => Some((name.as_str(), payload.as_str())),
            _ => None,
        }
    })
}

/// inner text of the `host = [...]` literal on older embed pages
pub fn host_array(html: &str) -> Option<&str> {
    HOST_ARRAY
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// path of the server assignment call. newer pages wrap it in fetchWithRetry,
/// older ones call fetch straight on an /api/ path
pub fn server_lookup_path(html: &str) -> Option<&str> {
    FETCH_WITH_RETRY
        .captures(html)
        .or_else(|| API_FETCH.captures(html))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

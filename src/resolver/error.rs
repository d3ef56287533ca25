pub type AppResult<T> = Result<T, Error>;

/// every way a resolution can die. nothing here ever reaches the caller as a
/// panic, main converts it into the error object and a non-zero exit
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // timeouts, dns failures, refused connections. the base-url stage eats
    // these itself and falls back, every later stage aborts with this
    #[error("network request failed: {0}")]
    Network(String),

    // a required marker was missing from a page, which usually means the
    // site shipped a new layout
    #[error("{0} not found in page")]
    PatternNotFound(&'static str),

    // the bundle itself was malformed (outer base64 or the json inside it).
    // single bad values inside an otherwise valid bundle are kept raw and
    // never surface here
    #[error("decode failed: {0}")]
    Decode(String),

    // a page body that can't even be read as text
    #[error("upstream returned malformed data: {0}")]
    UpstreamData(String),
}

use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use mockall::automock;
use reqwest::header;
use tracing::{debug, error};

use crate::{
    config::{PARTNER_CHAIN_DEPTH, PARTNER_EMBED_MARKER},
    resolver::{
        error::{AppResult, Error},
        utils::pattern_utils,
    },
};

/// one page of the chain, replaced at every hop
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub url: String,
    pub html: String,
}

/// the site serves relative player links for plain concatenation against the
/// base, no path normalization happens anywhere
pub fn resolve_player_url(base_url: &str, data_url: &str) -> String {
    if data_url.starts_with("http") {
        data_url.to_string()
    } else {
        format!("{base_url}{data_url}")
    }
}

// some of the partner hosts ignore accept-encoding negotiation and send gzip
// regardless, so sniff the magic bytes before trusting the body as text
fn decode_page_bytes(bytes: &[u8]) -> AppResult<String> {
    if bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b {
        let mut decoder = GzDecoder::new(bytes);
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).map_err(|e| {
            error!("failed to decompress gzip page body: {}", e);
            Error::UpstreamData(format!("failed to decompress gzip page body: {}", e))
        })?;
        Ok(decompressed)
    } else {
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            error!("page body is not valid utf-8: {}", e);
            Error::UpstreamData(format!("page body is not valid utf-8: {}", e))
        })
    }
}

pub type DynPageChainService = Arc<dyn PageChainServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait PageChainServiceTrait {
    /// fetches the channel's stream page and chases whichever chain of
    /// embeds this layout variant uses, returning the final document that
    /// carries the obfuscated bootstrap variables
    async fn walk(&self, base_url: &str, channel_id: &str) -> AppResult<PageDocument>;
}

pub struct PageChainService {
    http: reqwest::Client,
}

impl PageChainService {
    // the browser identity and the timeout both sit on the client already
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    // every hop sends the same browser-shaped headers pinned to the base,
    // the user agent is already on the client itself
    async fn fetch_page(&self, url: &str, base_url: &str) -> AppResult<PageDocument> {
        debug!("fetching {}", url);

        let response = self
            .http
            .get(url)
            .header(header::REFERER, format!("{base_url}/"))
            .header(header::ORIGIN, base_url)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| {
                error!("page fetch failed for {}: {}", url, e);
                Error::Network(format!("page fetch failed: {}", e))
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            error!("failed to read page body from {}: {}", url, e);
            Error::Network(format!("failed to read page body: {}", e))
        })?;

        let html = decode_page_bytes(&bytes)?;
        debug!("got {} bytes of html from {} (status {})", html.len(), url, status);

        Ok(PageDocument {
            url: url.to_string(),
            html,
        })
    }
}

#[async_trait]
impl PageChainServiceTrait for PageChainService {
    async fn walk(&self, base_url: &str, channel_id: &str) -> AppResult<PageDocument> {
        let stream_page_url = format!("{base_url}/stream/stream-{channel_id}.php");
        let mut page = self.fetch_page(&stream_page_url, base_url).await?;

        // partner-hosted channels bury the player a fixed number of embeds deep
        if page.html.contains(PARTNER_EMBED_MARKER) {
            for hop in 1..=PARTNER_CHAIN_DEPTH {
                let Some(src) = pattern_utils::first_iframe_src(&page.html) else {
                    error!("embed chain broken at hop {} of {}", hop, PARTNER_CHAIN_DEPTH);
                    return Err(Error::PatternNotFound("iframe src"));
                };
                let src = src.to_string();
                debug!("hop {}: following iframe {}", hop, src);
                page = self.fetch_page(&src, base_url).await?;
            }
            return Ok(page);
        }

        // default layout: a PLAYER 2 link, then one nested iframe inside it
        let Some(data_url) = pattern_utils::player_two_data_url(&page.html) else {
            error!("no PLAYER 2 entry on stream page for channel {}", channel_id);
            return Err(Error::PatternNotFound("PLAYER 2 data-url"));
        };
        let player_url = resolve_player_url(base_url, data_url);
        debug!("PLAYER 2 url: {}", player_url);

        page = self.fetch_page(&player_url, base_url).await?;

        let Some(nested) = pattern_utils::first_iframe_src(&page.html) else {
            error!("no nested iframe inside the player page");
            return Err(Error::PatternNotFound("nested iframe src"));
        };
        let nested = nested.to_string();
        debug!("nested iframe url: {}", nested);

        self.fetch_page(&nested, base_url).await
    }
}

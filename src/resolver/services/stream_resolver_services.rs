use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    model::{ResolvedStream, StreamHeaders},
    resolver::{
        error::AppResult,
        services::{
            base_url_services::{BaseUrlService, DynBaseUrlService},
            bootstrap_services::decode_bootstrap,
            handshake_services::{DynHandshakeService, HandshakeService},
            page_chain_services::{DynPageChainService, PageChainService},
        },
    },
};

/// current best-known key -> edge domain mapping. the assignment endpoint has
/// no stable contract, so extend here as new keys show up instead of guessing
/// more rules
pub fn playlist_url(server_key: &str, channel_key: &str) -> String {
    if server_key == "top1/cdn" {
        format!("https://top1.newkso.ru/top1/cdn/{channel_key}/mono.m3u8")
    } else {
        format!("https://{server_key}new.newkso.ru/{server_key}/{channel_key}/mono.m3u8")
    }
}

/// scheme+domain form of the auth host, always normalized onto https.
/// older bundles ship the host without a scheme
pub fn host_origin(host: &str) -> String {
    let after_scheme = match host.split_once("//") {
        Some((_, rest)) => rest,
        None => host,
    };
    let domain = after_scheme.split('/').next().unwrap_or(after_scheme);
    format!("https://{domain}")
}

pub type DynStreamResolverService = Arc<dyn StreamResolverServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait StreamResolverServiceTrait {
    async fn resolve(&self, channel_id: &str) -> AppResult<ResolvedStream>;
}

pub struct StreamResolverService {
    base_url: DynBaseUrlService,
    page_chain: DynPageChainService,
    handshake: DynHandshakeService,
    config: Arc<AppConfig>,
}

impl StreamResolverService {
    pub fn new(
        base_url: DynBaseUrlService,
        page_chain: DynPageChainService,
        handshake: DynHandshakeService,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            base_url,
            page_chain,
            handshake,
            config,
        }
    }

    /// wires the real stages over one shared client. nothing here is cached
    /// or kept between calls, every resolution starts from the seed again
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        // i like to make it look like a real browser, and here the site
        // actually checks
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let base_url =
            Arc::new(BaseUrlService::new(http.clone(), config.clone())) as DynBaseUrlService;
        let page_chain = Arc::new(PageChainService::new(http.clone())) as DynPageChainService;
        let handshake =
            Arc::new(HandshakeService::new(http, config.clone())) as DynHandshakeService;

        Self::new(base_url, page_chain, handshake, config)
    }
}

#[async_trait]
impl StreamResolverServiceTrait for StreamResolverService {
    async fn resolve(&self, channel_id: &str) -> AppResult<ResolvedStream> {
        let base_url = self.base_url.resolve_active_base().await;
        debug!("active base url: {}", base_url);

        let page = self.page_chain.walk(&base_url, channel_id).await?;

        let bundle = decode_bootstrap(&page.html)?;
        debug!("channel key: {}", bundle.channel_key);

        self.handshake.authenticate(&base_url, &bundle).await?;

        let host_raw = host_origin(&bundle.host);
        let server_key = self
            .handshake
            .assign_server(&page.html, &host_raw, &bundle.channel_key)
            .await?;

        if server_key.is_empty() {
            // known weak point: we still build a url so the caller can see
            // what we would have played, it just probably won't resolve
            warn!("assignment endpoint gave no server key for channel {}", channel_id);
        }

        let url = playlist_url(&server_key, &bundle.channel_key);
        info!("resolved channel {} to {}", channel_id, url);

        Ok(ResolvedStream {
            url,
            headers: StreamHeaders {
                referer: format!("{host_raw}/"),
                origin: host_raw,
                user_agent: self.config.user_agent.clone(),
                connection: "Keep-Alive".to_string(),
            },
        })
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header;
use tracing::{debug, error, warn};

use crate::{
    config::AppConfig,
    model::ServerLookupResponse,
    resolver::{
        error::{AppResult, Error},
        services::bootstrap_services::BootstrapBundle,
        utils::pattern_utils,
    },
};

pub type DynHandshakeService = Arc<dyn HandshakeServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait HandshakeServiceTrait {
    /// replays the auth call the player would make. the response carries
    /// nothing we use, the call just has to land before the assignment lookup
    async fn authenticate(&self, base_url: &str, bundle: &BootstrapBundle) -> AppResult<()>;

    /// asks the assignment endpoint which edge node serves this channel.
    /// a body we can't read degrades to an empty key, not a failure
    async fn assign_server(
        &self,
        html: &str,
        host_raw: &str,
        channel_key: &str,
    ) -> AppResult<String>;
}

pub struct HandshakeService {
    http: reqwest::Client,
    config: Arc<AppConfig>,
}

impl HandshakeService {
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl HandshakeServiceTrait for HandshakeService {
    async fn authenticate(&self, base_url: &str, bundle: &BootstrapBundle) -> AppResult<()> {
        let empty = String::new();
        let auth_url = format!(
            "{}{}?channel_id={}&ts={}&rnd={}&sig={}",
            bundle.host,
            bundle.script_path,
            urlencoding::encode(&bundle.channel_key),
            urlencoding::encode(bundle.fields.get("b_ts").unwrap_or(&empty)),
            urlencoding::encode(bundle.fields.get("b_rnd").unwrap_or(&empty)),
            urlencoding::encode(bundle.fields.get("b_sig").unwrap_or(&empty)),
        );
        debug!("auth url: {}", auth_url);

        let response = self
            .http
            .get(&auth_url)
            .header(header::REFERER, format!("{base_url}/"))
            .header(header::ORIGIN, base_url)
            .send()
            .await
            .map_err(|e| {
                error!("auth handshake request failed: {}", e);
                Error::Network(format!("auth handshake failed: {}", e))
            })?;

        if !response.status().is_success() {
            warn!("auth handshake returned status {}", response.status());
        }

        Ok(())
    }

    async fn assign_server(
        &self,
        html: &str,
        host_raw: &str,
        channel_key: &str,
    ) -> AppResult<String> {
        let Some(lookup_path) = pattern_utils::server_lookup_path(html) else {
            error!("no server lookup endpoint in the embed page");
            return Err(Error::PatternNotFound("server lookup endpoint"));
        };

        let lookup_url = format!("{host_raw}{lookup_path}{channel_key}");
        debug!("server lookup url: {}", lookup_url);

        // this endpoint only answers when the request looks like it came from
        // the player cdn, not from the auth host
        let response = self
            .http
            .get(&lookup_url)
            .header(
                header::REFERER,
                format!("{}/", self.config.cdn_front_origin),
            )
            .header(header::ORIGIN, self.config.cdn_front_origin.as_str())
            .send()
            .await
            .map_err(|e| {
                error!("server lookup request failed: {}", e);
                Error::Network(format!("server lookup failed: {}", e))
            })?;

        debug!("server lookup status: {}", response.status());

        match response.json::<ServerLookupResponse>().await {
            Ok(body) => Ok(body.server_key.unwrap_or_default()),
            Err(e) => {
                warn!("server lookup body was not usable json: {}", e);
                Ok(String::new())
            }
        }
    }
}

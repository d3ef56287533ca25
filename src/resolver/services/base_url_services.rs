use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, warn};

use crate::config::AppConfig;

pub type DynBaseUrlService = Arc<dyn BaseUrlServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait BaseUrlServiceTrait {
    /// lands on whatever domain the aggregator is using this week.
    /// infallible on purpose: the fallback mirror usually still works, so a
    /// dead seed is a guess, not an abort
    async fn resolve_active_base(&self) -> String;
}

pub struct BaseUrlService {
    http: reqwest::Client,
    config: Arc<AppConfig>,
}

impl BaseUrlService {
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl BaseUrlServiceTrait for BaseUrlService {
    async fn resolve_active_base(&self) -> String {
        // the client follows redirects itself, we only care where it ends up
        match self.http.get(&self.config.seed_url).send().await {
            Ok(response) => {
                let landed = response.url().to_string();
                debug!("seed {} landed on {}", self.config.seed_url, landed);
                landed.trim_end_matches('/').to_string()
            }
            Err(e) => {
                warn!(
                    "seed domain unreachable ({}), using fallback {}",
                    e, self.config.fallback_base_url
                );
                self.config.fallback_base_url.clone()
            }
        }
    }
}

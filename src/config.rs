#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

// rotating site constants. the target swaps these every few weeks, so they all live
// here instead of being scattered through the pipeline stages

// variable names the embed page has used for the encoded bundle, newest first
pub const BUNDLE_VAR_CANDIDATES: &[&str] = &["XJZ", "XKZK", "xjz", "xkzk"];

// pages hosted by this partner hide the player behind a fixed chain of embeds
pub const PARTNER_EMBED_MARKER: &str = "wikisport.best";
pub const PARTNER_CHAIN_DEPTH: usize = 3;

// older embed pages don't ship the auth script path in the bundle, they xor it
// against a single byte instead
pub const LEGACY_SCRIPT_PATH_BYTES: &[u8] = &[40, 60, 61, 33, 103, 57, 33, 57];
pub const LEGACY_SCRIPT_PATH_KEY: u8 = 73;

#[derive(clap::Parser)]
pub struct AppConfig {
    // channel id as shown on the aggregator, e.g. 36
    pub channel_id: String,

    // emit the per-stage diagnostic trail on stderr
    #[clap(long)]
    pub debug: bool,

    // production or development
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    // known entry point, redirects to whatever domain is live this week
    #[clap(long, env, default_value = "https://daddylive.sx/")]
    pub seed_url: String,

    // used when the seed can't be reached at all
    #[clap(long, env, default_value = "https://daddylivestream.com")]
    pub fallback_base_url: String,

    // browser identity sent on every request, the site rejects obvious bots
    #[clap(
        long,
        env,
        default_value = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    )]
    pub user_agent: String,

    // the assignment endpoint only answers requests that claim this origin
    #[clap(long, env, default_value = "https://jxoxkplay.xyz")]
    pub cdn_front_origin: String,

    // per-request timeout, nothing retries so this is also the stage budget
    #[clap(long, env, default_value = "10")]
    pub request_timeout_secs: u64,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    // defaults aren't really needed here but it's here as a bad fallback
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            debug: false,
            cargo_env: CargoEnv::Development,
            seed_url: "https://daddylive.sx/".to_string(),
            fallback_base_url: "https://daddylivestream.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            cdn_front_origin: "https://jxoxkplay.xyz".to_string(),
            request_timeout_secs: 10,
            sentry_dsn: None,
        }
    }
}

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use tracing::error;

use resolvestream::{
    AppConfig, ErrorBody, Logger, StreamResolverService, StreamResolverServiceTrait,
};

// one resolution per invocation, nothing persists between runs
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // any failure, a missing channel id included, is exit code 1
    let config = Arc::new(AppConfig::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(1);
    }));

    // guards are kept alive so the writer flushes before exit
    let guards = Logger::init(config.cargo_env, config.debug, config.sentry_dsn.clone());

    let resolver = StreamResolverService::from_config(config.clone());

    match resolver.resolve(&config.channel_id).await {
        Ok(stream) => {
            // the one thing stdout is for
            println!("{}", serde_json::to_string(&stream)?);
            Ok(())
        }
        Err(e) => {
            error!("resolution failed for channel {}: {}", config.channel_id, e);
            eprintln!(
                "{}",
                serde_json::to_string(&ErrorBody {
                    error: e.to_string(),
                })?
            );
            drop(guards);
            std::process::exit(1);
        }
    }
}

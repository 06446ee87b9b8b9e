use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veriseal::config::NotaryConfig;
use veriseal::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veriseal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NotaryConfig::from_env();
    server::serve(config).await?;
    Ok(())
}

//! chatlens - chat screenshot analysis and reply suggestion service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatlens::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before reading any configuration)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "chatlens=info"
    } else {
        "chatlens=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}

//! Tomo - personal productivity tracker with chunked tasks, focus sessions and XP streaks

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tomo=debug,tower_http=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tomo v{}", env!("CARGO_PKG_VERSION"));

    // Run CLI
    tomo::cli::run()?;

    Ok(())
}

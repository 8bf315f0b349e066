use anyhow::Context;
use tripverse_app::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tripverse_app=debug,tripverse_search=debug,tripverse_account=debug,tripverse_store=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = tripverse_store::Config::load().context("Failed to load config")?;
    let app = App::bootstrap(&config)
        .await
        .context("Failed to start application")?;
    let loggers = app.log_changes();

    let feed = app.destinations.load().await;
    tracing::info!(
        "{} destinations, {} featured",
        feed.destinations.len(),
        feed.featured_destinations.len()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");

    for logger in loggers {
        logger.abort();
    }
    app.shutdown().await;
    Ok(())
}

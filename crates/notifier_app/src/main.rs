mod config;
mod logging;

use anyhow::{bail, Context};
use notifier_engine::{
    DiscordPublisher, DiscordSettings, Dispatcher, FetchSettings, PublishError, Publisher,
    ReqwestArticleFetcher, SeenSetStore,
};
use notifier_logging::{notifier_info, notifier_warn};

use config::NotifierConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NotifierConfig::from_env().context("invalid configuration")?;
    logging::initialize(config.log_destination, config.log_level);

    let fetcher = ReqwestArticleFetcher::new(
        &config.api_url,
        FetchSettings {
            request_timeout: config.request_timeout,
            ..FetchSettings::default()
        },
    )
    .context("cannot build article fetcher")?;
    notifier_info!(
        "Polling {} every {:?}",
        fetcher.url(),
        config.poll_interval
    );

    let publisher = DiscordPublisher::new(DiscordSettings {
        api_base: config.discord_api_base.clone(),
        request_timeout: config.request_timeout,
        ..DiscordSettings::new(config.bot_token.clone(), config.channel_id)
    })
    .context("cannot build discord client")?;
    check_destination(&publisher).await?;

    let dispatcher = Dispatcher::new(
        Box::new(fetcher),
        Box::new(publisher),
        SeenSetStore::new(&config.sent_articles_file),
        config.article_base_url.clone(),
    );

    tokio::select! {
        () = dispatcher.run_forever(config.poll_interval) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            notifier_info!("Shutting down");
        }
    }
    Ok(())
}

/// Rejected credentials stop the process; any other lookup failure is left to
/// the poll loop, which retries the lookup every cycle.
async fn check_destination(publisher: &DiscordPublisher) -> anyhow::Result<()> {
    match publisher.resolve_destination().await {
        Ok(destination) => {
            notifier_info!(
                "Announcing to channel {} ({})",
                destination.channel_id,
                destination.name.as_deref().unwrap_or("unnamed")
            );
        }
        Err(PublishError::HttpStatus { status: 401, .. }) => {
            bail!("discord rejected the bot token");
        }
        Err(err) => notifier_warn!("Announcement channel not reachable yet: {}", err),
    }
    Ok(())
}

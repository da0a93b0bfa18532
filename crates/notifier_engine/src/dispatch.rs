use std::time::Duration;

use notifier_core::{
    format_publish_date, permalink, update, Article, DispatchState, Effect, Msg, OutboundMessage,
    UNKNOWN_DATE,
};
use notifier_logging::{
    notifier_debug, notifier_error, notifier_info, notifier_warn, set_poll_cycle,
};

use crate::{
    ArticleFetcher, ContentTransformer, Destination, MarkdownTransformer, PublishError, Publisher,
    SeenSetStore,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What a single poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub fetched: usize,
    pub announced: usize,
    pub failed: usize,
    pub persisted: bool,
}

#[derive(Debug, thiserror::Error)]
enum AnnounceError {
    #[error("destination unavailable, announcement dropped")]
    NoDestination,
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Destination lookup, done at most once per cycle.
enum DestinationSlot {
    Unresolved,
    Resolved(Destination),
    Unavailable,
}

/// Owns the seen-set and drives fetch -> filter -> transform -> publish -> persist.
pub struct Dispatcher {
    fetcher: Box<dyn ArticleFetcher>,
    publisher: Box<dyn Publisher>,
    transformer: MarkdownTransformer,
    store: SeenSetStore,
    article_base_url: String,
    state: DispatchState,
    cycle: u64,
    unsaved: bool,
}

impl Dispatcher {
    /// Restores the seen-set from `store` before the first cycle.
    pub fn new(
        fetcher: Box<dyn ArticleFetcher>,
        publisher: Box<dyn Publisher>,
        store: SeenSetStore,
        article_base_url: impl Into<String>,
    ) -> Self {
        let article_base_url = article_base_url.into();
        let seen = store.load();
        notifier_info!(
            "Loaded {} announced article ids from {:?}",
            seen.len(),
            store.path()
        );
        Self {
            fetcher,
            publisher,
            transformer: MarkdownTransformer::with_base_url(&article_base_url),
            store,
            article_base_url,
            state: DispatchState::with_seen(seen),
            cycle: 0,
            unsaved: false,
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    /// Polls forever, sleeping `interval` after every cycle.
    pub async fn run_forever(mut self, interval: Duration) {
        loop {
            self.run_cycle().await;
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        set_poll_cycle(self.cycle);
        notifier_debug!("Fetching new articles");

        let mut report = CycleReport::default();
        let msg = match self.fetcher.fetch().await {
            Ok(articles) => {
                report.fetched = articles.len();
                if articles.is_empty() {
                    notifier_info!("No articles found");
                }
                Msg::ArticlesFetched(articles)
            }
            Err(err) => Msg::FetchFailed {
                reason: err.to_string(),
            },
        };
        if let Msg::FetchFailed { reason } = &msg {
            notifier_warn!(
                "Fetching articles failed ({} in a row): {}",
                self.state.consecutive_fetch_failures() + 1,
                reason
            );
        }

        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        let mut destination = DestinationSlot::Unresolved;
        let mut persist_requested = false;
        for effect in effects {
            match effect {
                Effect::Announce(article) => {
                    match self.announce(&article, &mut destination).await {
                        Ok(()) => report.announced += 1,
                        Err(err) => {
                            report.failed += 1;
                            notifier_error!("Article {} not announced: {}", article.id, err);
                        }
                    }
                }
                Effect::PersistSeenSet => persist_requested = true,
            }
        }

        if persist_requested || self.unsaved {
            report.persisted = self.persist();
        }
        report
    }

    async fn announce(
        &self,
        article: &Article,
        slot: &mut DestinationSlot,
    ) -> Result<(), AnnounceError> {
        let destination = self
            .destination(slot)
            .await
            .ok_or(AnnounceError::NoDestination)?;

        let body = self.transformer.transform(&article.content);
        let date = format_publish_date(article.publish_at.as_deref()).unwrap_or_else(|err| {
            notifier_warn!("Article {}: {}", article.id, err);
            UNKNOWN_DATE.to_string()
        });
        let link = permalink(&self.article_base_url, &article.id);
        let message =
            OutboundMessage::announcement(article, body.markdown, body.image_url, &date, link);

        self.publisher.publish(destination, &message).await?;
        notifier_info!("Announced article {} ({})", article.id, message.title);
        Ok(())
    }

    async fn destination<'a>(&self, slot: &'a mut DestinationSlot) -> Option<&'a Destination> {
        if let DestinationSlot::Unresolved = slot {
            *slot = match self.publisher.resolve_destination().await {
                Ok(destination) => DestinationSlot::Resolved(destination),
                Err(err) => {
                    notifier_error!("Cannot resolve announcement channel: {}", err);
                    DestinationSlot::Unavailable
                }
            };
        }
        match &*slot {
            DestinationSlot::Resolved(destination) => Some(destination),
            DestinationSlot::Unresolved | DestinationSlot::Unavailable => None,
        }
    }

    fn persist(&mut self) -> bool {
        match self.store.save(self.state.seen()) {
            Ok(()) => {
                notifier_debug!(
                    "Saved {} article ids to {:?}",
                    self.state.seen().len(),
                    self.store.path()
                );
                self.unsaved = false;
                true
            }
            Err(err) => {
                notifier_error!("Failed to save seen-set to {:?}: {}", self.store.path(), err);
                self.unsaved = true;
                false
            }
        }
    }
}

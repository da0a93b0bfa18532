use crate::{DispatchState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Articles are walked in reverse API order so that a newest-first listing is
/// announced oldest first. Ids are marked seen before the announcement is
/// attempted; a failed send is not retried.
pub fn update(mut state: DispatchState, msg: Msg) -> (DispatchState, Vec<Effect>) {
    let effects = match msg {
        Msg::ArticlesFetched(articles) => {
            state.record_fetch_success();
            let mut effects = Vec::new();
            for article in articles.into_iter().rev() {
                if state.mark_seen(article.id.clone()) {
                    effects.push(Effect::Announce(article));
                }
            }
            if !effects.is_empty() {
                effects.push(Effect::PersistSeenSet);
            }
            effects
        }
        Msg::FetchFailed { .. } => {
            state.record_fetch_failure();
            Vec::new()
        }
    };

    (state, effects)
}

use crate::{ArticleId, SeenSet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchState {
    seen: SeenSet,
    consecutive_fetch_failures: u32,
}

impl DispatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a seen-set restored from disk.
    pub fn with_seen(seen: SeenSet) -> Self {
        Self {
            seen,
            ..Self::default()
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn consecutive_fetch_failures(&self) -> u32 {
        self.consecutive_fetch_failures
    }

    pub(crate) fn mark_seen(&mut self, id: ArticleId) -> bool {
        self.seen.insert(id)
    }

    pub(crate) fn record_fetch_success(&mut self) {
        self.consecutive_fetch_failures = 0;
    }

    pub(crate) fn record_fetch_failure(&mut self) {
        self.consecutive_fetch_failures = self.consecutive_fetch_failures.saturating_add(1);
    }
}

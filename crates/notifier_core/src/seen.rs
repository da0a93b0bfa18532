use std::collections::HashSet;

use crate::ArticleId;

/// Ids of articles that have already been announced. Grows only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeenSet {
    ids: HashSet<ArticleId>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ArticleId) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` when the id was not present before.
    pub fn insert(&mut self, id: ArticleId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in lexical order, for deterministic persistence.
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.ids.iter().map(ArticleId::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<ArticleId> for SeenSet {
    fn from_iter<T: IntoIterator<Item = ArticleId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

use crate::Article;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Transform and publish this article. Its id is already marked seen.
    Announce(Article),
    /// The seen-set grew during this cycle and must be written out.
    PersistSeenSet,
}

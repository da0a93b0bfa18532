use crate::Article;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The API answered; articles are in the order the API listed them.
    ArticlesFetched(Vec<Article>),
    /// The API could not be reached or returned an unusable response.
    FetchFailed { reason: String },
}

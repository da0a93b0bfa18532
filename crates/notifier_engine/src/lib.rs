//! Notifier engine: fetching, transforming, publishing and persisting articles.
mod discord;
mod dispatch;
mod fetch;
mod persist;
mod publish;
mod store;
mod transform;
mod truncate;
mod types;

pub use discord::{DiscordPublisher, DiscordSettings, DEFAULT_DISCORD_API_BASE};
pub use dispatch::{CycleReport, Dispatcher, DEFAULT_POLL_INTERVAL};
pub use fetch::{ArticleFetcher, FetchSettings, ReqwestArticleFetcher};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use publish::{Destination, PublishError, Publisher};
pub use store::SeenSetStore;
pub use transform::{ContentTransformer, MarkdownTransformer, TransformedBody};
pub use truncate::truncate_chars;
pub use types::{FailureKind, FetchError};

//! Notifier core: article model, seen-set and the pure dispatch state machine.
mod article;
mod effect;
mod message;
mod msg;
mod seen;
mod state;
mod update;

pub use article::{
    parse_listing, Article, ArticleId, ArticleListing, InvalidArticle, UNTITLED_PLACEHOLDER,
};
pub use effect::Effect;
pub use message::{
    format_publish_date, permalink, InvalidDate, LinkButton, OutboundMessage, ACCENT_COLOR,
    FOOTER_PREFIX, LINK_LABEL, UNKNOWN_DATE,
};
pub use msg::Msg;
pub use seen::SeenSet;
pub use state::DispatchState;
pub use update::update;

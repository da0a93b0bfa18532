use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used when the API omits one or sends an empty string.
pub const UNTITLED_PLACEHOLDER: &str = "Geen titel";

const UNKNOWN_ID: &str = "unknown";
const LISTING_FIELD: &str = "data";

/// Article identifier, normalized to a string so that `5` and `"5"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalizes an arbitrary JSON value into an id.
    ///
    /// Strings are kept verbatim, numbers and booleans use their JSON text, and a
    /// missing or `null` id becomes `"unknown"`.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::new(UNKNOWN_ID),
            Some(Value::String(s)) => Self::new(s.as_str()),
            Some(Value::Number(n)) => Self::new(n.to_string()),
            Some(Value::Bool(b)) => Self::new(b.to_string()),
            Some(other) => Self::new(other.to_string()),
        }
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArticleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    pub title: Option<String>,
    /// Rich-text (HTML) body; empty when the API sent none.
    pub content: String,
    pub publish_at: Option<String>,
}

/// A listing entry that is not a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("article entry is not an object: {found}")]
pub struct InvalidArticle {
    pub found: &'static str,
}

impl Article {
    /// Decodes one entry of the listing.
    ///
    /// Missing fields and fields of an unexpected type degrade to their
    /// defaults; only an entry that is not an object is rejected.
    pub fn from_json(value: Value) -> Result<Self, InvalidArticle> {
        let mut entry = match value {
            Value::Object(entry) => entry,
            other => {
                return Err(InvalidArticle {
                    found: json_kind(&other),
                })
            }
        };

        let content = match entry.remove("message") {
            Some(Value::Object(mut message)) => match message.remove("content") {
                Some(Value::String(content)) => content,
                _ => String::new(),
            },
            _ => String::new(),
        };
        Ok(Self {
            id: ArticleId::from_json(entry.get("id")),
            title: scalar_text(entry.remove("title")),
            content,
            publish_at: match entry.remove("publish_at") {
                Some(Value::String(raw)) => Some(raw),
                _ => None,
            },
        })
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => UNTITLED_PLACEHOLDER,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Result of decoding an article listing response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleListing {
    /// Articles in the order the API returned them.
    pub articles: Vec<Article>,
    /// Entries that were not objects.
    pub skipped: usize,
}

/// Extracts the articles from a `{ "data": [...] }` response body.
///
/// A missing or non-array `data` field yields an empty listing.
pub fn parse_listing(body: Value) -> ArticleListing {
    let entries = match body {
        Value::Object(mut map) => match map.remove(LISTING_FIELD) {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut listing = ArticleListing::default();
    for entry in entries {
        match Article::from_json(entry) {
            Ok(article) => listing.articles.push(article),
            Err(_) => listing.skipped += 1,
        }
    }
    listing
}

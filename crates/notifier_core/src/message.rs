use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::{Article, ArticleId};

pub const ACCENT_COLOR: u32 = 0x00ff00;
pub const UNKNOWN_DATE: &str = "Onbekende datum";
pub const FOOTER_PREFIX: &str = "Gepubliceerd op: ";
pub const LINK_LABEL: &str = "Origineel bericht";

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Link button attached below the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Platform-neutral announcement handed to a publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub title: String,
    pub body: String,
    pub color: u32,
    pub footer: String,
    pub image_url: Option<String>,
    pub link: Option<LinkButton>,
}

impl OutboundMessage {
    pub fn announcement(
        article: &Article,
        body: String,
        image_url: Option<String>,
        formatted_date: &str,
        link_url: Option<String>,
    ) -> Self {
        Self {
            title: article.display_title().to_string(),
            body,
            color: ACCENT_COLOR,
            footer: format!("{FOOTER_PREFIX}{formatted_date}"),
            image_url,
            link: link_url.map(|url| LinkButton {
                label: LINK_LABEL.to_string(),
                url,
            }),
        }
    }
}

/// Permalink of an article: the base URL with the id appended verbatim.
/// Returns `None` when no base URL is configured.
pub fn permalink(base_url: &str, id: &ArticleId) -> Option<String> {
    if base_url.trim().is_empty() {
        None
    } else {
        Some(format!("{base_url}{id}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized publish timestamp {raw:?}")]
pub struct InvalidDate {
    pub raw: String,
}

/// Formats an ISO-8601 timestamp as `dd/mm/YYYY HH:MM` in its own offset.
///
/// A missing or empty timestamp yields [`UNKNOWN_DATE`].
pub fn format_publish_date(raw: Option<&str>) -> Result<String, InvalidDate> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(UNKNOWN_DATE.to_string()),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(display(&dt));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(raw, format) {
            return Ok(display(&dt));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt.format(DISPLAY_FORMAT).to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.format("%d/%m/%Y 00:00").to_string());
    }

    Err(InvalidDate {
        raw: raw.to_string(),
    })
}

fn display(dt: &DateTime<FixedOffset>) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_publish_date, permalink};
    use crate::ArticleId;

    #[test]
    fn utc_suffix_keeps_wall_clock() {
        assert_eq!(
            format_publish_date(Some("2024-10-19T09:05:00Z")).unwrap(),
            "19/10/2024 09:05"
        );
    }

    #[test]
    fn offset_is_not_converted() {
        assert_eq!(
            format_publish_date(Some("2024-10-19T21:30:00+02:00")).unwrap(),
            "19/10/2024 21:30"
        );
        assert_eq!(
            format_publish_date(Some("2024-10-19 21:30:00.123456+02:00")).unwrap(),
            "19/10/2024 21:30"
        );
    }

    #[test]
    fn naive_timestamps_are_accepted() {
        assert_eq!(
            format_publish_date(Some("2024-10-19T07:00:00")).unwrap(),
            "19/10/2024 07:00"
        );
        assert_eq!(format_publish_date(Some("2024-10-19")).unwrap(), "19/10/2024 00:00");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = format_publish_date(Some("yesterday")).unwrap_err();
        assert_eq!(err.raw, "yesterday");
    }

    #[test]
    fn permalink_appends_id() {
        assert_eq!(
            permalink("https://example.com/article/", &ArticleId::from("7")).as_deref(),
            Some("https://example.com/article/7")
        );
        assert_eq!(permalink("  ", &ArticleId::from("7")), None);
    }
}

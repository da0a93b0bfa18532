use std::borrow::Cow;
use std::time::Duration;

use notifier_core::OutboundMessage;
use notifier_logging::{notifier_debug, notifier_warn};
use reqwest::header::{AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{truncate_chars, Destination, PublishError, Publisher};

pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const CLIENT_USER_AGENT: &str = concat!(
    "DiscordBot (article-notifier, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);
const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 4096;
const MAX_FOOTER_CHARS: usize = 2048;
const MAX_BUTTON_LABEL_CHARS: usize = 80;
const MAX_ERROR_BODY_CHARS: usize = 300;
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(1);

const COMPONENT_ACTION_ROW: u8 = 1;
const COMPONENT_BUTTON: u8 = 2;
const BUTTON_STYLE_LINK: u8 = 5;

#[derive(Debug, Clone)]
pub struct DiscordSettings {
    pub api_base: String,
    pub token: String,
    pub channel_id: u64,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Extra attempts after a 429 before the send is given up.
    pub rate_limit_retries: u32,
    /// Upper bound for a single rate-limit wait, whatever `retry-after` says.
    pub max_rate_limit_wait: Duration,
}

impl DiscordSettings {
    pub fn new(token: impl Into<String>, channel_id: u64) -> Self {
        Self {
            api_base: DEFAULT_DISCORD_API_BASE.to_string(),
            token: token.into(),
            channel_id,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            rate_limit_retries: 3,
            max_rate_limit_wait: Duration::from_secs(60),
        }
    }
}

/// Publishes announcements as embeds through the Discord REST API.
#[derive(Debug, Clone)]
pub struct DiscordPublisher {
    settings: DiscordSettings,
    client: reqwest::Client,
}

impl DiscordPublisher {
    pub fn new(settings: DiscordSettings) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| PublishError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.settings.api_base.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bot {}", self.settings.token))
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }
}

#[async_trait::async_trait]
impl Publisher for DiscordPublisher {
    async fn resolve_destination(&self) -> Result<Destination, PublishError> {
        let channel_id = self.settings.channel_id;
        let url = self.endpoint(&format!("channels/{channel_id}"));
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let response = check_status(response, channel_id).await?;
        let channel: ChannelInfo = response
            .json()
            .await
            .map_err(|err| PublishError::Network(err.to_string()))?;
        notifier_debug!("Resolved channel {} ({:?})", channel_id, channel.name);
        Ok(Destination {
            channel_id,
            name: channel.name,
        })
    }

    async fn publish(
        &self,
        destination: &Destination,
        message: &OutboundMessage,
    ) -> Result<(), PublishError> {
        let url = self.endpoint(&format!("channels/{}/messages", destination.channel_id));
        let payload = CreateMessage::from_outbound(message);
        let mut attempt = 0;
        loop {
            let response = self
                .authorize(self.client.post(url.as_str()))
                .json(&payload)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            match check_status(response, destination.channel_id).await {
                Ok(_) => return Ok(()),
                Err(PublishError::RateLimited { retry_after })
                    if attempt < self.settings.rate_limit_retries =>
                {
                    attempt += 1;
                    let wait = retry_after
                        .unwrap_or(DEFAULT_RATE_LIMIT_WAIT)
                        .min(self.settings.max_rate_limit_wait);
                    notifier_warn!(
                        "Rate limited by discord, retrying in {:?} (attempt {}/{})",
                        wait,
                        attempt,
                        self.settings.rate_limit_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

async fn check_status(response: Response, channel_id: u64) -> Result<Response, PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Err(PublishError::ChannelUnavailable {
            channel_id,
            status: status.as_u16(),
        }),
        StatusCode::TOO_MANY_REQUESTS => Err(PublishError::RateLimited {
            retry_after: response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(PublishError::HttpStatus {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS).into_owned(),
            })
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PublishError {
    if err.is_timeout() {
        PublishError::Timeout(err.to_string())
    } else {
        PublishError::Network(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    embeds: Vec<Embed<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<ActionRow<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<Cow<'a, str>>,
    color: u32,
    footer: EmbedFooter<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedFooter<'a> {
    text: Cow<'a, str>,
}

#[derive(Debug, Serialize)]
struct EmbedImage<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct ActionRow<'a> {
    #[serde(rename = "type")]
    kind: u8,
    components: Vec<LinkButtonComponent<'a>>,
}

#[derive(Debug, Serialize)]
struct LinkButtonComponent<'a> {
    #[serde(rename = "type")]
    kind: u8,
    style: u8,
    label: Cow<'a, str>,
    url: &'a str,
}

impl<'a> CreateMessage<'a> {
    fn from_outbound(message: &'a OutboundMessage) -> Self {
        let embed = Embed {
            title: truncate_chars(&message.title, MAX_TITLE_CHARS),
            description: Some(message.body.as_str())
                .filter(|body| !body.is_empty())
                .map(|body| truncate_chars(body, MAX_DESCRIPTION_CHARS)),
            color: message.color,
            footer: EmbedFooter {
                text: truncate_chars(&message.footer, MAX_FOOTER_CHARS),
            },
            image: message
                .image_url
                .as_deref()
                .map(|url| EmbedImage { url }),
        };
        let components = message
            .link
            .iter()
            .map(|link| ActionRow {
                kind: COMPONENT_ACTION_ROW,
                components: vec![LinkButtonComponent {
                    kind: COMPONENT_BUTTON,
                    style: BUTTON_STYLE_LINK,
                    label: truncate_chars(&link.label, MAX_BUTTON_LABEL_CHARS),
                    url: &link.url,
                }],
            })
            .collect();

        Self {
            embeds: vec![embed],
            components,
        }
    }
}

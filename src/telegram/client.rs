//! MTProto user client wrapper around grammers

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use grammers_client::types::Message;
use grammers_client::{Client, Config, InitParams, InputMessage};
use grammers_mtsender::InvocationError;
use grammers_session::{PackedChat, Session};
use grammers_tl_types as tl;
use std::path::PathBuf;

use crate::collector::{ChannelMessage, LinkAnnotation, MarkupMode, MessageSource, SourceError};
use crate::core::error::AppError;

/// RPC errors meaning the channel cannot be read by this account
const UNAVAILABLE_ERRORS: &[&str] = &[
    "CHANNEL_INVALID",
    "CHANNEL_PRIVATE",
    "CHANNEL_PUBLIC_GROUP_NA",
    "USERNAME_INVALID",
    "USERNAME_NOT_OCCUPIED",
];

/// Where the signed-in user session comes from
#[derive(Debug, Clone)]
pub enum SessionSource {
    /// Base64 of a saved grammers session
    Encoded(String),
    /// grammers session file
    File(PathBuf),
}

impl SessionSource {
    fn load(&self) -> Result<Session, AppError> {
        match self {
            SessionSource::Encoded(encoded) => {
                let bytes = general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| AppError::Session(format!("Session string is not valid base64: {}", e)))?;
                Session::load(&bytes).map_err(|e| AppError::Session(format!("Failed to load session: {}", e)))
            }
            SessionSource::File(path) => {
                if !path.exists() {
                    return Err(AppError::Session(format!("Session file {} not found", path.display())));
                }
                log::info!("Loading session from {:?}", path);
                Session::load_file(path).map_err(|e| AppError::Session(format!("Failed to load session: {}", e)))
            }
        }
    }
}

/// Telegram user account used to read channels and publish posts
pub struct TelegramSource {
    client: Client,
}

impl TelegramSource {
    /// Connect to Telegram with an existing user session
    ///
    /// # Arguments
    /// * `api_id` - Telegram API ID from my.telegram.org
    /// * `api_hash` - Telegram API hash from my.telegram.org
    /// * `session` - Previously signed-in session
    ///
    /// Authorization is not checked here; the pipeline does it through
    /// [`MessageSource::is_authorized`].
    pub async fn connect(api_id: i32, api_hash: &str, session: &SessionSource) -> Result<Self, AppError> {
        log::info!("Initializing MTProto client...");
        let session = session.load()?;

        let config = Config {
            session,
            api_id,
            api_hash: api_hash.to_string(),
            params: InitParams {
                device_model: "Config Harvester".to_string(),
                system_version: "1.0".to_string(),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
                system_lang_code: "en".to_string(),
                lang_code: "en".to_string(),
                ..Default::default()
            },
        };

        log::info!("Connecting to Telegram...");
        let client = Client::connect(config)
            .await
            .map_err(|e| AppError::Session(format!("Failed to connect: {}", e)))?;

        Ok(Self { client })
    }
}

/// Username part of `@name`, `t.me/name` or `https://t.me/name`
pub fn normalize_channel(channel: &str) -> &str {
    let trimmed = channel.trim();
    let name = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let name = name.strip_prefix("t.me/").unwrap_or(name);
    let name = name.strip_prefix('@').unwrap_or(name);
    name.trim_end_matches('/')
}

fn classify(err: InvocationError) -> SourceError {
    match &err {
        InvocationError::Rpc(rpc) if UNAVAILABLE_ERRORS.contains(&rpc.name.as_str()) => {
            SourceError::ChannelUnavailable(err.to_string())
        }
        _ => SourceError::Request(err.to_string()),
    }
}

fn to_channel_message(message: &Message) -> ChannelMessage {
    let text = message.text();
    let links = message
        .fmt_entities()
        .map(|entities| {
            entities
                .iter()
                .filter_map(|entity| match entity {
                    tl::enums::MessageEntity::TextUrl(e) => Some(LinkAnnotation::TextUrl { url: e.url.clone() }),
                    tl::enums::MessageEntity::Url(e) => Some(LinkAnnotation::Url {
                        offset: e.offset,
                        length: e.length,
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    ChannelMessage {
        date: Some(message.date()),
        text: if text.is_empty() { None } else { Some(text.to_string()) },
        links,
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    type Handle = PackedChat;

    async fn is_authorized(&self) -> Result<bool, SourceError> {
        self.client.is_authorized().await.map_err(classify)
    }

    async fn resolve(&self, channel: &str) -> Result<PackedChat, SourceError> {
        let username = normalize_channel(channel);
        match self.client.resolve_username(username).await {
            Ok(Some(chat)) => Ok(chat.pack()),
            Ok(None) => Err(SourceError::ChannelUnavailable(format!("no chat named {}", username))),
            Err(e) => Err(classify(e)),
        }
    }

    async fn recent_messages(&self, channel: &PackedChat, limit: usize) -> Result<Vec<ChannelMessage>, SourceError> {
        let mut iter = self.client.iter_messages(channel.clone()).limit(limit);
        let mut messages = Vec::with_capacity(limit);
        while let Some(message) = iter.next().await.map_err(classify)? {
            messages.push(to_channel_message(&message));
        }
        Ok(messages)
    }

    async fn send(&self, destination: &str, text: &str, mode: MarkupMode) -> Result<(), SourceError> {
        let chat = self.resolve(destination).await?;
        let message = match mode {
            MarkupMode::Markdown => InputMessage::markdown(text),
            MarkupMode::Plain => InputMessage::text(text),
        };
        self.client.send_message(chat, message).await.map_err(classify)?;
        Ok(())
    }
}

//! Canonical message format shared by every provider adapter

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Unified message structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(text.into()))
    }

    pub fn tool(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Tool, MessageContent::Text(text.into()))
    }

    pub fn with_parts(role: MessageRole, parts: Vec<ContentPart>) -> Self {
        Self::new(role, MessageContent::Parts(parts))
    }

    pub fn contains_image(&self) -> bool {
        self.content
            .parts()
            .iter()
            .any(|p| matches!(p, ContentPart::Image { .. }))
    }

    pub fn contains_audio(&self) -> bool {
        self.content
            .parts()
            .iter()
            .any(|p| matches!(p, ContentPart::Audio { .. }))
    }

    /// Concatenated text of the message, ignoring binary parts.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(ContentPart::as_text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Message role.
///
/// Well-known roles get their own variant; anything else a provider accepts travels as
/// `Custom`. The role is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
    Custom(CustomRole),
}

/// A role name outside the well-known set.
///
/// Only produced by parsing, so it is never empty and never spells a well-known role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomRole(String);

impl CustomRole {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl MessageRole {
    /// Parse `name` into a role. Well-known names map to their variant.
    pub fn custom(name: impl AsRef<str>) -> crate::Result<Self> {
        name.as_ref().parse()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Custom(role) => role.as_str(),
        }
    }
}

impl FromStr for MessageRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" => return Err(crate::Error::empty_role()),
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            other => Self::Custom(CustomRole(other.to_string())),
        })
    }
}

impl TryFrom<String> for MessageRole {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MessageRole> for String {
    fn from(role: MessageRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message content (can be string or array of content parts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn parts(&self) -> &[ContentPart] {
        match self {
            MessageContent::Text(_) => &[],
            MessageContent::Parts(parts) => parts,
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// One unit of message content.
///
/// Binary payloads are kept as the raw bytes the caller supplied. Only the serde
/// representation carries them as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text {
        text: String,
    },
    Image {
        media_type: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Audio {
        media_type: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        ContentPart::Image {
            media_type: media_type.into(),
            data,
            detail: None,
        }
    }

    pub fn image_with_detail(
        media_type: impl Into<String>,
        data: Vec<u8>,
        detail: impl Into<String>,
    ) -> Self {
        ContentPart::Image {
            media_type: media_type.into(),
            data,
            detail: Some(detail.into()),
        }
    }

    pub fn audio(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        ContentPart::Audio {
            media_type: media_type.into(),
            data,
        }
    }

    pub fn image_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let media_type = guess_media_type(path)
            .or_else(|| crate::normalize::media::detect_image_media_type(&data))
            .ok_or_else(|| {
                crate::Error::invalid_sequence_part(path.display().to_string(), "image file")
            })?;
        Ok(Self::image(media_type, data))
    }

    pub fn audio_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let media_type = guess_media_type(path).ok_or_else(|| {
            crate::Error::invalid_sequence_part(path.display().to_string(), "audio file")
        })?;
        Ok(Self::audio(media_type, data))
    }

    /// The `type` tag this part serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentPart::Text { .. } => "text",
            ContentPart::Image { .. } => "image",
            ContentPart::Audio { .. } => "audio",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            _ => None,
        }
    }
}

fn guess_media_type(path: &Path) -> Option<String> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mt = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp3" => "audio/mp3",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(mt.to_string())
}

mod base64_bytes {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

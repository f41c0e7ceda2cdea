//! Message normalization: turns whatever the caller hands to a call into canonical messages.
//!
//! Accepted shapes:
//! - a plain string, which becomes one message with the default role
//! - a single [`Message`], or a list of them, passed through untouched
//! - a list of strings, content parts and in-memory images, aggregated into ONE message
//! - provider-native JSON (`serde_json::Value`) following the same rules
//!
//! ```rust
//! use ai_lib_calls::normalize::{normalize, SequencePart};
//! use ai_lib_calls::types::{ContentPart, MessageContent};
//!
//! let messages = normalize(
//!     vec![SequencePart::from("Hello"), ContentPart::text("World").into()],
//!     "user",
//! )
//! .unwrap();
//! assert_eq!(messages.len(), 1);
//! assert!(matches!(&messages[0].content, MessageContent::Parts(p) if p.len() == 2));
//! ```

pub mod media;

use crate::types::message::{ContentPart, Message, MessageContent, MessageRole};
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Role used when the caller does not name one.
pub const DEFAULT_ROLE: &str = "user";

/// An in-memory image object recognized by the normalizer.
///
/// Implement this for the image type of whatever imaging crate the caller uses. `format`
/// is an optional hint (e.g. `"PNG"`); without it the media type is sniffed from the bytes.
pub trait NativeImage: Send + Sync {
    fn to_bytes(&self) -> Vec<u8>;

    fn format(&self) -> Option<String> {
        None
    }
}

/// One element of a mixed content sequence.
#[derive(Clone)]
pub enum SequencePart {
    Text(String),
    Part(ContentPart),
    Image(Arc<dyn NativeImage>),
}

impl SequencePart {
    pub fn image(image: impl NativeImage + 'static) -> Self {
        SequencePart::Image(Arc::new(image))
    }

    fn into_content_part(self) -> Result<ContentPart> {
        match self {
            SequencePart::Text(text) => Ok(ContentPart::Text { text }),
            SequencePart::Part(part) => Ok(part),
            SequencePart::Image(image) => {
                let data = image.to_bytes();
                let media_type = image
                    .format()
                    .and_then(|f| media::media_type_from_format(&f))
                    .or_else(|| media::detect_image_media_type(&data))
                    .ok_or_else(|| {
                        Error::invalid_sequence_part(
                            format!("<image: {} bytes, unknown format>", data.len()),
                            "native image",
                        )
                    })?;
                Ok(ContentPart::Image {
                    media_type,
                    data,
                    detail: None,
                })
            }
        }
    }
}

impl fmt::Debug for SequencePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencePart::Text(text) => f.debug_tuple("Text").field(text).finish(),
            SequencePart::Part(part) => f.debug_tuple("Part").field(part).finish(),
            SequencePart::Image(image) => f
                .debug_struct("Image")
                .field("format", &image.format())
                .finish_non_exhaustive(),
        }
    }
}

impl From<&str> for SequencePart {
    fn from(text: &str) -> Self {
        SequencePart::Text(text.to_string())
    }
}

impl From<String> for SequencePart {
    fn from(text: String) -> Self {
        SequencePart::Text(text)
    }
}

impl From<ContentPart> for SequencePart {
    fn from(part: ContentPart) -> Self {
        SequencePart::Part(part)
    }
}

/// Everything a call accepts as its messages.
#[derive(Debug, Clone)]
pub enum MessageInput {
    Text(String),
    Message(Message),
    Messages(Vec<Message>),
    Parts(Vec<SequencePart>),
    Json(Value),
}

impl From<&str> for MessageInput {
    fn from(text: &str) -> Self {
        MessageInput::Text(text.to_string())
    }
}

impl From<String> for MessageInput {
    fn from(text: String) -> Self {
        MessageInput::Text(text)
    }
}

impl From<Message> for MessageInput {
    fn from(message: Message) -> Self {
        MessageInput::Message(message)
    }
}

impl From<Vec<Message>> for MessageInput {
    fn from(messages: Vec<Message>) -> Self {
        MessageInput::Messages(messages)
    }
}

impl From<Vec<SequencePart>> for MessageInput {
    fn from(parts: Vec<SequencePart>) -> Self {
        MessageInput::Parts(parts)
    }
}

impl From<Vec<ContentPart>> for MessageInput {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageInput::Parts(parts.into_iter().map(SequencePart::Part).collect())
    }
}

impl From<Vec<&str>> for MessageInput {
    fn from(parts: Vec<&str>) -> Self {
        MessageInput::Parts(parts.into_iter().map(SequencePart::from).collect())
    }
}

impl From<Value> for MessageInput {
    fn from(value: Value) -> Self {
        MessageInput::Json(value)
    }
}

/// Converts caller input into canonical messages using a fixed default role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNormalizer {
    default_role: MessageRole,
}

impl Default for MessageNormalizer {
    fn default() -> Self {
        Self {
            default_role: MessageRole::User,
        }
    }
}

impl MessageNormalizer {
    pub fn new(default_role: &str) -> Result<Self> {
        Ok(Self {
            default_role: default_role.parse()?,
        })
    }

    pub fn default_role(&self) -> &MessageRole {
        &self.default_role
    }

    pub fn normalize(&self, input: impl Into<MessageInput>) -> Result<Vec<Message>> {
        let messages = match input.into() {
            MessageInput::Text(text) => vec![self.text_message(text)],
            MessageInput::Message(message) => vec![message],
            MessageInput::Messages(messages) => messages,
            MessageInput::Parts(parts) => {
                if parts.is_empty() {
                    Vec::new()
                } else {
                    let content = parts
                        .into_iter()
                        .map(SequencePart::into_content_part)
                        .collect::<Result<Vec<_>>>()?;
                    vec![self.parts_message(content)]
                }
            }
            MessageInput::Json(value) => self.normalize_json(value)?,
        };
        tracing::debug!(
            count = messages.len(),
            default_role = %self.default_role,
            "normalized messages"
        );
        Ok(messages)
    }

    fn normalize_json(&self, value: Value) -> Result<Vec<Message>> {
        match value {
            Value::String(text) => Ok(vec![self.text_message(text)]),
            Value::Object(_) if is_message_object(&value) => Ok(vec![parse_message(value)?]),
            Value::Array(items) => {
                if items.iter().all(is_message_object) {
                    return items.into_iter().map(parse_message).collect();
                }
                let content = items
                    .into_iter()
                    .map(json_content_part)
                    .collect::<Result<Vec<_>>>()?;
                Ok(vec![self.parts_message(content)])
            }
            other => Err(Error::invalid_messages(
                other.to_string(),
                json_type_name(&other),
            )),
        }
    }

    fn text_message(&self, text: String) -> Message {
        Message::new(self.default_role.clone(), MessageContent::Text(text))
    }

    fn parts_message(&self, parts: Vec<ContentPart>) -> Message {
        Message::new(self.default_role.clone(), MessageContent::Parts(parts))
    }
}

/// Normalize `input` into canonical messages, using `role` wherever the input names none.
pub fn normalize(input: impl Into<MessageInput>, role: &str) -> Result<Vec<Message>> {
    MessageNormalizer::new(role)?.normalize(input)
}

fn is_message_object(value: &Value) -> bool {
    value
        .as_object()
        .map(|m| m.contains_key("role") && m.contains_key("content"))
        .unwrap_or(false)
}

fn parse_message(value: Value) -> Result<Message> {
    serde_json::from_value(value.clone())
        .map_err(|_| Error::invalid_messages(value.to_string(), json_type_name(&value)))
}

fn json_content_part(value: Value) -> Result<ContentPart> {
    match value {
        Value::String(text) => Ok(ContentPart::Text { text }),
        Value::Object(ref map) if map.contains_key("type") => serde_json::from_value(value.clone())
            .map_err(|_| Error::invalid_sequence_part(value.to_string(), "object")),
        other => Err(Error::invalid_sequence_part(
            other.to_string(),
            json_type_name(&other),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

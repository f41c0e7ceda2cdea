//! # Types Module
//!
//! Canonical data types shared by the normalizer, the tool converter and provider adapters.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and content |
//! | [`MessageRole`] | Message role (system, user, assistant, tool or custom) |
//! | [`ContentPart`] | Text, image or audio unit of content |
//! | [`StreamChunk`] | Streamed tool call fragment |
//! | [`ToolCall`] | Function/tool call from model response |
//! | [`ToolDefinition`] | Tool definition for model context |
//!
//! ## Example
//!
//! ```rust
//! use ai_lib_calls::types::{ContentPart, Message, MessageRole};
//!
//! let system = Message::system("You are a helpful assistant");
//! let user = Message::with_parts(
//!     MessageRole::User,
//!     vec![ContentPart::text("What is in this picture?")],
//! );
//! assert_eq!(user.text(), "What is in this picture?");
//! # let _ = system;
//! ```

pub mod events;
pub mod message;
pub mod tool;

pub use events::StreamChunk;
pub use message::{ContentPart, CustomRole, Message, MessageContent, MessageRole};
pub use tool::{FunctionDefinition, ToolCall, ToolDefinition, ToolResult};

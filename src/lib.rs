//! # ai-lib-calls
//!
//! Provider-agnostic call core for LLM applications: message normalization, tool
//! definition and stateful toolkits.
//!
//! ## Overview
//!
//! Every provider adapter needs the same three things before it can talk to a model:
//! a canonical list of messages, tool schemas the model can invoke, and a way to put a
//! streamed tool call back together. This crate provides those pieces without knowing
//! anything about a particular provider's wire format.
//!
//! ## Core Philosophy
//!
//! - **Explicit Metadata**: Tools are described by [`tools::ToolSpec`] values or `schemars`
//!   schemas, never discovered at runtime
//! - **Closed Types**: Content parts and stream chunks are closed enums
//! - **Fail Early**: Bad input, bad schemas and namespace collisions are rejected when they
//!   are defined, not when a model first calls the tool
//!
//! ## Quick Start
//!
//! ```rust
//! use ai_lib_calls::normalize::{normalize, SequencePart};
//! use ai_lib_calls::{ContentPart, MessageRole};
//!
//! let messages = normalize(
//!     vec![
//!         SequencePart::from("Describe this picture:"),
//!         SequencePart::from(ContentPart::image("image/png", vec![0x89, b'P', b'N', b'G'])),
//!     ],
//!     "user",
//! )
//! .unwrap();
//!
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].role, MessageRole::User);
//! assert!(messages[0].contains_image());
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core type definitions (messages, stream chunks, tools) |
//! | [`normalize`] | Conversion of loose inputs into canonical messages |
//! | [`tools`] | Tool conversion, docstring parsing and schema generation |
//! | [`toolkit`] | Stateful toolkits, templated descriptions and namespaces |
//! | [`utils`] | Reassembly of streamed tool calls |
//! | [`config`] | YAML-loadable configuration |

pub mod config;
pub mod normalize;
pub mod toolkit;
pub mod tools;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use config::CoreConfig;
pub use normalize::{MessageInput, MessageNormalizer, SequencePart};
pub use toolkit::{NamespaceRegistry, ToolKit, ToolKitDefinition, ToolKitMethod};
pub use tools::{Describable, Tool, ToolConverter, ToolModel, ToolSet, ToolSpec};
pub use types::{
    events::StreamChunk,
    message::{ContentPart, CustomRole, Message, MessageContent, MessageRole},
    tool::{ToolCall, ToolDefinition, ToolResult},
};
pub use utils::{assemble_stream, StreamedToolCall, ToolCallAssembler};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};

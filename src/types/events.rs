//! Streamed tool call fragments

use serde::{Deserialize, Serialize};

/// One fragment of a streamed tool call, as delivered by a provider stream transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chunk_type")]
pub enum StreamChunk {
    /// Opens a tool call: carries its name and id
    #[serde(rename = "ToolCallName")]
    ToolCallName { name: String, id: String },

    /// A piece of the call's argument JSON
    #[serde(rename = "ToolCallArguments")]
    ToolCallArguments { delta: String },
}

impl StreamChunk {
    pub fn name(name: impl Into<String>, id: impl Into<String>) -> Self {
        StreamChunk::ToolCallName {
            name: name.into(),
            id: id.into(),
        }
    }

    pub fn arguments(delta: impl Into<String>) -> Self {
        StreamChunk::ToolCallArguments {
            delta: delta.into(),
        }
    }
}

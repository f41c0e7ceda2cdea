use crate::types::events::StreamChunk;
use crate::types::tool::ToolCall;
use crate::Result;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// A tool call rebuilt from stream fragments. `arguments` is the raw concatenated JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamedToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl StreamedToolCall {
    /// Parse the assembled argument JSON. Empty arguments parse as an empty object.
    pub fn parse_arguments(&self) -> Result<serde_json::Value> {
        let trimmed = self.arguments.trim();
        if trimmed.is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    pub fn into_tool_call(self) -> Result<ToolCall> {
        let arguments = self.parse_arguments()?;
        Ok(ToolCall {
            id: self.id,
            name: self.name,
            arguments,
        })
    }
}

/// Collects tool call chunks (name + argument fragments) into complete calls.
///
/// Argument fragments are concatenated in arrival order and never validated here.
/// Calls are kept apart by id, so interleaved calls assemble independently.
#[derive(Debug, Default)]
pub struct ToolCallAssembler {
    tool_calls: Vec<StreamedToolCall>,
    current: Option<usize>,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk. Argument chunks belong to the most recently named call.
    pub fn push(&mut self, chunk: StreamChunk) {
        match chunk {
            StreamChunk::ToolCallName { name, id } => self.on_started(id, name),
            StreamChunk::ToolCallArguments { delta } => match self.current {
                Some(idx) => self.tool_calls[idx].arguments.push_str(&delta),
                None => tracing::warn!(
                    fragment = %delta,
                    "dropping tool call arguments received before any tool call name"
                ),
            },
        }
    }

    pub fn on_started(&mut self, id: String, name: String) {
        if let Some(idx) = self.position(&id) {
            self.current = Some(idx);
            return;
        }
        tracing::trace!(id = %id, name = %name, "tool call started");
        self.tool_calls.push(StreamedToolCall {
            id,
            name,
            arguments: String::new(),
        });
        self.current = Some(self.tool_calls.len() - 1);
    }

    pub fn on_partial(&mut self, id: &str, fragment: &str) {
        match self.position(id) {
            Some(idx) => self.tool_calls[idx].arguments.push_str(fragment),
            None => tracing::warn!(id = %id, "dropping arguments for unknown tool call"),
        }
    }

    pub fn len(&self) -> usize {
        self.tool_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty()
    }

    /// Completed calls in the order their names first arrived.
    pub fn finalize(self) -> Vec<StreamedToolCall> {
        self.tool_calls
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tool_calls.iter().position(|t| t.id == id)
    }
}

/// Drain a chunk stream into completed tool calls. The first stream error is returned and
/// the partial state is dropped; dropping the future abandons it the same way.
pub async fn assemble_stream<S>(stream: S) -> Result<Vec<StreamedToolCall>>
where
    S: Stream<Item = Result<StreamChunk>>,
{
    let mut assembler = ToolCallAssembler::new();
    futures::pin_mut!(stream);
    while let Some(chunk) = stream.next().await {
        assembler.push(chunk?);
    }
    Ok(assembler.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_call() {
        let mut assembler = ToolCallAssembler::new();
        assembler.push(StreamChunk::name("format_book", "call_1"));
        assembler.push(StreamChunk::arguments("{\"title\": "));
        assembler.push(StreamChunk::arguments("\"Dune\"}"));

        let calls = assembler.finalize();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments, "{\"title\": \"Dune\"}");
        assert_eq!(calls[0].parse_arguments().unwrap(), json!({"title": "Dune"}));
    }

    #[test]
    fn test_arguments_before_name_are_dropped() {
        let mut assembler = ToolCallAssembler::new();
        assembler.push(StreamChunk::arguments("{}"));
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_interleaved_by_id() {
        let mut assembler = ToolCallAssembler::new();
        assembler.on_started("a".into(), "first".into());
        assembler.on_started("b".into(), "second".into());
        assembler.on_partial("b", "{\"y\":");
        assembler.on_partial("a", "{\"x\":");
        assembler.on_partial("a", "1}");
        assembler.on_partial("b", "2}");
        assembler.on_partial("zzz", "ignored");

        let calls = assembler.finalize();
        assert_eq!(calls[0].name, "first");
        assert_eq!(calls[0].arguments, "{\"x\":1}");
        assert_eq!(calls[1].arguments, "{\"y\":2}");
    }

    #[test]
    fn test_malformed_arguments_kept_raw() {
        let mut assembler = ToolCallAssembler::new();
        assembler.push(StreamChunk::name("f", "1"));
        assembler.push(StreamChunk::arguments("{\"broken\""));
        let call = assembler.finalize().remove(0);
        assert_eq!(call.arguments, "{\"broken\"");
        assert!(matches!(
            call.into_tool_call(),
            Err(crate::Error::Serialization(_))
        ));
    }

    #[test]
    fn test_assemble_stream() {
        let chunks = vec![
            Ok(StreamChunk::name("f", "1")),
            Ok(StreamChunk::arguments("{}")),
        ];
        let calls = tokio_test::block_on(assemble_stream(futures::stream::iter(chunks))).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].parse_arguments().unwrap(), json!({}));
    }
}

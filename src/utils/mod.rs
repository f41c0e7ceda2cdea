//! Supporting machinery for streamed responses.

pub mod tool_call_assembler;

pub use tool_call_assembler::{assemble_stream, StreamedToolCall, ToolCallAssembler};

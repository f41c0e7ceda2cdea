//! Book Toolkit Example
//!
//! This example walks through the whole call core without talking to a provider:
//! 1. Normalize a mixed user input into canonical messages
//! 2. Define a stateful toolkit whose descriptions depend on its fields
//! 3. Replay a streamed tool call and dispatch it to the right tool
//!
//! Usage:
//!   RUST_LOG=ai_lib_calls=debug cargo run --example book_toolkit

use ai_lib_calls::normalize::SequencePart;
use ai_lib_calls::tools::{arg, ParamSpec, ParamType};
use ai_lib_calls::{
    assemble_stream, ContentPart, CoreConfig, StreamChunk, ToolKit, ToolKitDefinition,
    ToolKitMethod, ToolSet, ToolSpec,
};
use anyhow::Context;
use futures::stream;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::json;

const CONFIG: &str = r#"
default_role: user
tools:
  require_parameter_docs: true
"#;

#[derive(Clone, Serialize, JsonSchema)]
struct BookTools {
    reading_level: String,
    shelf: Vec<String>,
}

impl ToolKit for BookTools {
    const NAMESPACE: Option<&'static str> = Some("books");

    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![
            ToolKitMethod::new(
                ToolSpec::new("format_book")
                    .doc(
                        "Returns the title and author of a book nicely formatted.

                        Reading level: {self.reading_level}

                        Args:
                            title: The title of the book.
                            author: The author of the book in all caps.
                        ",
                    )
                    .param(ParamSpec::new("title", ParamType::String))
                    .param(ParamSpec::new("author", ParamType::String)),
                |_kit: &BookTools, args| {
                    let title: String = arg(&args, "title")?;
                    let author: String = arg(&args, "author")?;
                    Ok(json!(format!("{} by {}", title, author.to_uppercase())))
                },
            ),
            ToolKitMethod::new(
                ToolSpec::new("on_shelf")
                    .doc(
                        "Checks whether a {genre} book is on the shelf of {self.shelf} books.

                        Args:
                            title: The title to look for.
                        ",
                    )
                    .param(ParamSpec::new("title", ParamType::String)),
                |kit: &BookTools, args| {
                    let title: String = arg(&args, "title")?;
                    Ok(json!(kit.shelf.contains(&title)))
                },
            ),
        ]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = CoreConfig::from_yaml_str(CONFIG).context("loading config")?;
    let normalizer = config.normalizer()?;

    let messages = normalizer.normalize(vec![
        SequencePart::from("Recommend a book like this one:"),
        SequencePart::from(ContentPart::image("image/png", vec![0x89, b'P', b'N', b'G'])),
    ])?;
    println!("Normalized {} message(s):", messages.len());
    for message in &messages {
        println!("  [{}] {:?}", message.role, message.text());
    }

    let kit = BookTools {
        reading_level: "beginner".into(),
        shelf: vec!["Dune".into(), "Emma".into()],
    };
    let definition = ToolKitDefinition::<BookTools>::define()?;
    let tools = ToolSet::from_tools(definition.create_tools_with(&kit, &config.converter())?)?;
    println!("\nTool definitions:");
    for definition in tools.definitions() {
        println!("{}", serde_json::to_string_pretty(&definition)?);
    }

    // A provider stream would deliver these fragments one by one.
    let chunks = vec![
        Ok(StreamChunk::name("books_format_book", "call_1")),
        Ok(StreamChunk::arguments("{\"title\": \"Dune\", ")),
        Ok(StreamChunk::arguments("\"author\": \"Frank Herbert\"}")),
        Ok(StreamChunk::name("books_on_shelf", "call_2")),
        Ok(StreamChunk::arguments("{\"title\": \"Dracula\"}")),
    ];
    let calls = assemble_stream(stream::iter(chunks)).await?;

    println!("\nTool results:");
    for call in calls {
        let call = call.into_tool_call()?;
        let result = tools.respond(&call);
        println!("  {} -> {}", call.name, result.content);
    }

    Ok(())
}

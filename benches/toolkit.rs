//! Benchmarks for tool creation and dispatch
//!
//! This benchmark measures:
//! - Template rendering per toolkit instance
//! - Argument validation and dispatch
//! - Streamed tool call accumulation

use ai_lib_calls::toolkit::template;
use ai_lib_calls::tools::{arg, ParamSpec, ParamType};
use ai_lib_calls::{
    NamespaceRegistry, StreamChunk, ToolCallAssembler, ToolKit, ToolKitDefinition, ToolKitMethod,
    ToolSpec,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::json;

#[derive(Clone, Serialize, JsonSchema)]
struct BookTools {
    reading_level: String,
}

impl ToolKit for BookTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("recommend_book")
                .doc(
                    "Recommends a {genre} book for a {self.reading_level} reader.

                    Args:
                        title: The title of the book.
                        year: The year it was published.
                    ",
                )
                .param(ParamSpec::new("title", ParamType::String))
                .param(ParamSpec::new("year", ParamType::Integer).with_default(json!(2000))),
            |kit: &BookTools, args| {
                let title: String = arg(&args, "title")?;
                let year: i64 = arg(&args, "year")?;
                Ok(json!(format!("{} ({}), {}", title, year, kit.reading_level)))
            },
        )]
    }
}

fn bench_template(c: &mut Criterion) {
    let template = "Recommends a {genre} book for a {self.reading_level} reader.";
    c.bench_function("escape_then_render", |b| {
        b.iter(|| {
            let escaped =
                template::escape_placeholders(black_box(template), |f| !f.starts_with("self."))
                    .unwrap();
            template::render(&escaped, |_| Some("beginner".to_string())).unwrap()
        })
    });
}

fn bench_create_tools(c: &mut Criterion) {
    let definition = ToolKitDefinition::<BookTools>::define_in(&NamespaceRegistry::new()).unwrap();
    let kit = BookTools {
        reading_level: "beginner".into(),
    };
    c.bench_function("create_tools", |b| {
        b.iter(|| definition.create_tools(black_box(&kit)).unwrap())
    });
}

fn bench_call(c: &mut Criterion) {
    let definition = ToolKitDefinition::<BookTools>::define_in(&NamespaceRegistry::new()).unwrap();
    let tools = definition
        .create_tools(&BookTools {
            reading_level: "beginner".into(),
        })
        .unwrap();
    let args = json!({"title": "Dune"});
    c.bench_function("validated_call", |b| {
        b.iter(|| tools[0].call(black_box(&args)).unwrap())
    });
}

fn bench_assembler(c: &mut Criterion) {
    let fragments: Vec<String> = r#"{"title": "The Left Hand of Darkness", "year": 1969}"#
        .chars()
        .collect::<Vec<_>>()
        .chunks(4)
        .map(|c| c.iter().collect())
        .collect();
    let mut group = c.benchmark_group("tool_call_assembly");
    group.throughput(Throughput::Elements(fragments.len() as u64));
    group.bench_function("accumulate_fragments", |b| {
        b.iter(|| {
            let mut assembler = ToolCallAssembler::new();
            assembler.push(StreamChunk::name("recommend_book", "call_1"));
            for fragment in &fragments {
                assembler.push(StreamChunk::arguments(fragment.as_str()));
            }
            assembler.finalize()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_template,
    bench_create_tools,
    bench_call,
    bench_assembler
);
criterion_main!(benches);

//! Tests for toolkit definition, namespaces and tool creation

use ai_lib_calls::tools::{arg, ParamSpec, ParamType};
use ai_lib_calls::{
    CoreConfig, Error, NamespaceRegistry, ToolKit, ToolKitDefinition, ToolKitMethod, ToolSet,
    ToolSpec,
};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone, Serialize, JsonSchema)]
struct BookTools {
    reading_level: String,
}

fn format_book() -> ToolSpec {
    ToolSpec::new("format_book")
        .doc(
            "Returns a {genre} book recommendation for a {self.reading_level} reader.

            Args:
                title: The title of the book.
                author: The author of the book.
            ",
        )
        .param(ParamSpec::new("title", ParamType::String))
        .param(ParamSpec::new("author", ParamType::String))
}

fn format_handler(
    _kit: &BookTools,
    args: serde_json::Map<String, Value>,
) -> ai_lib_calls::Result<Value> {
    let title: String = arg(&args, "title")?;
    let author: String = arg(&args, "author")?;
    Ok(json!(format!("{title} by {author}")))
}

impl ToolKit for BookTools {
    const NAMESPACE: Option<&'static str> = Some("books");

    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![
            ToolKitMethod::new(format_book(), format_handler),
            ToolKitMethod::new(
                ToolSpec::new("reading_level")
                    .doc("Reports the reading level: {self.reading_level}."),
                |kit: &BookTools, _| Ok(json!(kit.reading_level)),
            ),
        ]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct RivalBookTools {
    shelf: String,
}

impl ToolKit for RivalBookTools {
    const NAMESPACE: Option<&'static str> = Some("books");

    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("shelf").doc("Names the shelf {self.shelf}."),
            |kit: &RivalBookTools, _| Ok(json!(kit.shelf)),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct MovieTools {
    year: u32,
}

impl ToolKit for MovieTools {
    const NAMESPACE: Option<&'static str> = Some("movies");

    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("year").doc("Movies released in {self.year}."),
            |kit: &MovieTools, _| Ok(json!(kit.year)),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct PlainTools {
    label: String,
}

impl ToolKit for PlainTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("label").doc("Returns {self.label}."),
            |kit: &PlainTools, _| Ok(json!(kit.label)),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct OtherPlainTools {
    label: String,
}

impl ToolKit for OtherPlainTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("label").doc("Also returns {self.label}."),
            |kit: &OtherPlainTools, _| Ok(json!(kit.label)),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct UnknownFieldTools {
    reading_level: String,
}

impl ToolKit for UnknownFieldTools {
    const NAMESPACE: Option<&'static str> = Some("unknown_field");

    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("broken").doc("Uses {self.unknown_field}."),
            |_: &UnknownFieldTools, _| Ok(Value::Null),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct EmptyTools {
    name: String,
}

impl ToolKit for EmptyTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        Vec::new()
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct UndocumentedTools {
    name: String,
}

impl ToolKit for UndocumentedTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("silent").doc("   \n  "),
            |_: &UndocumentedTools, _| Ok(Value::Null),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct StatelessTools;

impl ToolKit for StatelessTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("shuffle").doc("Shuffles the {genre} shelf."),
            |_: &StatelessTools, _| Ok(json!("shuffled")),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct FormattedFieldTools {
    rating: f64,
}

impl ToolKit for FormattedFieldTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("rating").doc("Books rated {self.rating:.1} or more."),
            |kit: &FormattedFieldTools, _| Ok(json!(kit.rating)),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct ConvertedFieldTools {
    label: String,
}

impl ToolKit for ConvertedFieldTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("label").doc("Shows {self.label!r} and {other!r}."),
            |kit: &ConvertedFieldTools, _| Ok(json!(kit.label)),
        )]
    }
}

#[derive(Clone, Serialize, JsonSchema)]
struct IndexTools {
    index: String,
}

impl ToolKit for IndexTools {
    fn tool_methods() -> Vec<ToolKitMethod<Self>> {
        vec![ToolKitMethod::new(
            ToolSpec::new("search")
                .doc("Searches the {self.index} index.")
                .param(ParamSpec::new("query", ParamType::String)),
            |kit: &IndexTools, _| Ok(json!(kit.index)),
        )]
    }
}

#[test]
fn test_same_namespace_collides() {
    let registry = NamespaceRegistry::new();
    ToolKitDefinition::<BookTools>::define_in(&registry).unwrap();

    let err = ToolKitDefinition::<RivalBookTools>::define_in(&registry).unwrap_err();
    match err {
        Error::NamespaceCollision { namespace, owner } => {
            assert_eq!(namespace, "books");
            assert!(owner.ends_with("BookTools"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_redefining_same_toolkit_is_idempotent() {
    let registry = NamespaceRegistry::new();
    ToolKitDefinition::<BookTools>::define_in(&registry).unwrap();
    ToolKitDefinition::<BookTools>::define_in(&registry).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_distinct_namespaces_succeed() {
    let registry = NamespaceRegistry::new();
    ToolKitDefinition::<BookTools>::define_in(&registry).unwrap();
    ToolKitDefinition::<MovieTools>::define_in(&registry).unwrap();
    assert!(registry.contains("books"));
    assert!(registry.contains("movies"));
}

#[test]
fn test_null_namespaces_succeed() {
    let registry = NamespaceRegistry::new();
    ToolKitDefinition::<PlainTools>::define_in(&registry).unwrap();
    ToolKitDefinition::<OtherPlainTools>::define_in(&registry).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_reset_releases_namespaces() {
    let registry = NamespaceRegistry::new();
    ToolKitDefinition::<BookTools>::define_in(&registry).unwrap();
    registry.reset();
    ToolKitDefinition::<RivalBookTools>::define_in(&registry).unwrap();
}

#[test]
fn test_unknown_self_field_rejected() {
    let registry = NamespaceRegistry::new();
    let err = ToolKitDefinition::<UnknownFieldTools>::define_in(&registry).unwrap_err();
    assert!(matches!(err, Error::ToolKitValidation { .. }));
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("self.unknown_field")
    );
    // A failed definition claims nothing.
    assert!(!registry.contains("unknown_field"));
}

#[test]
fn test_zero_methods_rejected() {
    let err = ToolKitDefinition::<EmptyTools>::define_in(&NamespaceRegistry::new()).unwrap_err();
    assert!(matches!(err, Error::ToolKitValidation { .. }));
    assert!(err.to_string().contains("no toolkit tool method found"));
}

#[test]
fn test_blank_docstring_rejected() {
    let err =
        ToolKitDefinition::<UndocumentedTools>::define_in(&NamespaceRegistry::new()).unwrap_err();
    assert!(err.to_string().contains("must have a docstring"));
}

#[test]
fn test_known_field_rendered_and_other_placeholders_kept() {
    let definition = ToolKitDefinition::<BookTools>::define_in(&NamespaceRegistry::new()).unwrap();
    let tools = definition
        .create_tools(&BookTools {
            reading_level: "beginner".into(),
        })
        .unwrap();

    assert_eq!(
        tools[0].description(),
        "Returns a {genre} book recommendation for a beginner reader."
    );
    assert_eq!(
        tools[0].parameters()["properties"]["title"]["description"],
        "The title of the book."
    );
}

#[test]
fn test_tools_follow_declaration_order_and_carry_state() {
    let definition = ToolKitDefinition::<BookTools>::define_in(&NamespaceRegistry::new()).unwrap();
    let tools = definition
        .create_tools(&BookTools {
            reading_level: "advanced".into(),
        })
        .unwrap();

    let names: Vec<_> = tools.iter().map(|t| t.qualified_name()).collect();
    assert_eq!(names, vec!["books_format_book", "books_reading_level"]);
    for tool in &tools {
        assert_eq!(tool.namespace(), Some("books"));
        assert_eq!(tool.state_value("reading_level"), Some(&json!("advanced")));
    }
    assert_eq!(tools[1].call(&Value::Null).unwrap(), json!("advanced"));
}

#[test]
fn test_instances_render_independently() {
    let definition = ToolKitDefinition::<BookTools>::define_in(&NamespaceRegistry::new()).unwrap();
    let beginner = definition
        .create_tools(&BookTools {
            reading_level: "beginner".into(),
        })
        .unwrap();
    let expert = definition
        .create_tools(&BookTools {
            reading_level: "expert".into(),
        })
        .unwrap();
    assert_eq!(beginner[1].description(), "Reports the reading level: beginner.");
    assert_eq!(expert[1].description(), "Reports the reading level: expert.");
}

#[test]
fn test_global_definition_feeds_tool_set() {
    let tools = MovieTools { year: 1984 }.create_tools().unwrap();
    let set = ToolSet::from_tools(tools).unwrap();
    let tool = set.get("movies_year").unwrap();
    assert_eq!(tool.description(), "Movies released in 1984.");
    assert_eq!(tool.call(&json!({})).unwrap(), json!(1984));
    assert_eq!(
        NamespaceRegistry::global().owner("movies").as_deref(),
        Some(std::any::type_name::<MovieTools>())
    );
}

#[test]
fn test_unit_struct_toolkit_creates_tools() {
    let tools = StatelessTools.create_tools().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].qualified_name(), "shuffle");
    assert_eq!(tools[0].description(), "Shuffles the {genre} shelf.");
    assert_eq!(tools[0].call(&json!({})).unwrap(), json!("shuffled"));
}

#[test]
fn test_self_placeholder_with_format_spec_rejected() {
    let registry = NamespaceRegistry::new();
    let err = ToolKitDefinition::<FormattedFieldTools>::define_in(&registry).unwrap_err();
    assert!(matches!(err, Error::ToolKitValidation { .. }));
    assert!(err.to_string().contains("{self.rating:.1}"));
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("self.rating")
    );
}

#[test]
fn test_self_placeholder_with_conversion_rejected() {
    let err = ToolKitDefinition::<ConvertedFieldTools>::define_in(&NamespaceRegistry::new())
        .unwrap_err();
    assert!(err.to_string().contains("{self.label!r}"));
}

#[test]
fn test_configured_converter_applies_to_toolkit_tools() {
    let config = CoreConfig::from_yaml_str("tools:\n  require_parameter_docs: true\n").unwrap();
    let definition = ToolKitDefinition::<IndexTools>::define_in(&NamespaceRegistry::new()).unwrap();
    let kit = IndexTools {
        index: "catalog".into(),
    };

    assert!(definition.create_tools(&kit).is_ok());
    let err = definition
        .create_tools_with(&kit, &config.converter())
        .unwrap_err();
    assert!(matches!(err, Error::ToolDefinition { .. }));
    assert!(err.to_string().contains("parameter has no description"));
}

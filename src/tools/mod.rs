//! Tools: callables paired with the schema a model needs to invoke them.
//!
//! A tool is described explicitly through [`ToolSpec`] metadata (or a `schemars` schema for
//! [`ToolModel`] types) and converted into a [`Tool`] by the [`ToolConverter`].
//!
//! ```rust
//! use ai_lib_calls::tools::{arg, ParamSpec, ParamType, ToolConverter, ToolSpec};
//! use serde_json::json;
//!
//! let spec = ToolSpec::new("format_book")
//!     .doc("Returns the title and author of a book nicely formatted.\n\nArgs:\n    title: The title.\n    author: The author.")
//!     .param(ParamSpec::new("title", ParamType::String))
//!     .param(ParamSpec::new("author", ParamType::String));
//!
//! let tool = ToolConverter::default()
//!     .convert(&spec, None, None, |args| {
//!         let title: String = arg(&args, "title")?;
//!         let author: String = arg(&args, "author")?;
//!         Ok(json!(format!("{title} by {author}")))
//!     })
//!     .unwrap();
//!
//! let out = tool.call(&json!({"title": "Dune", "author": "Frank Herbert"})).unwrap();
//! assert_eq!(out, json!("Dune by Frank Herbert"));
//! ```

pub mod convert;
pub mod docstring;
pub mod schema;

pub use convert::{ConverterConfig, ToolConverter, DEFAULT_TOOL_DESCRIPTION};

use crate::types::tool::{ToolCall, ToolDefinition, ToolResult};
use crate::utils::tool_call_assembler::StreamedToolCall;
use crate::{Error, ErrorContext, Result};
use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

/// The function behind a tool. Receives the (defaulted, validated) arguments object.
pub type ToolHandler = dyn Fn(Map<String, Value>) -> Result<Value> + Send + Sync;

/// JSON type of a declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array(Box<ParamType>),
    Object,
    /// A string restricted to the listed values
    Enum(Vec<String>),
    Any,
}

impl ParamType {
    pub fn to_schema(&self) -> Value {
        match self {
            ParamType::String => schema::schema_from_type_name("string"),
            ParamType::Integer => schema::schema_from_type_name("integer"),
            ParamType::Number => schema::schema_from_type_name("number"),
            ParamType::Boolean => schema::schema_from_type_name("boolean"),
            ParamType::Object => schema::schema_from_type_name("object"),
            ParamType::Array(items) => json!({"type": "array", "items": items.to_schema()}),
            ParamType::Enum(values) => json!({"type": "string", "enum": values}),
            ParamType::Any => json!({}),
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub default: Option<Value>,
    /// Explicit description; takes precedence over the docstring's `Args:` entry.
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            description: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Declarative description of a tool-producing callable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolSpec {
    pub name: String,
    pub doc: Option<String>,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// Anything that can state its own name, docs and parameters.
pub trait Describable {
    fn describe(&self) -> ToolSpec;
}

impl Describable for ToolSpec {
    fn describe(&self) -> ToolSpec {
        self.clone()
    }
}

/// A tool whose arguments are a whole Rust type.
///
/// The type's doc comment is the tool description and its field doc comments document the
/// parameters. Calling the tool deserializes the arguments into `Self` and runs [`ToolModel::call`].
pub trait ToolModel: schemars::JsonSchema + DeserializeOwned + Send + Sync + 'static {
    fn call(self) -> Result<Value>;
}

/// Read one argument out of a tool's argument object. Missing arguments read as `null`,
/// so `Option<T>` targets yield `None`.
pub fn arg<T: DeserializeOwned>(args: &Map<String, Value>, name: &str) -> Result<T> {
    let value = args.get(name).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        Error::tool_arguments(
            format!("invalid argument `{}`: {}", name, e),
            ErrorContext::new().with_field_path(name),
        )
    })
}

/// A converted, callable tool.
#[derive(Clone)]
pub struct Tool {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) parameters: Value,
    pub(crate) namespace: Option<String>,
    pub(crate) defaults: Map<String, Value>,
    pub(crate) state: Map<String, Value>,
    pub(crate) validator: Option<Arc<JSONSchema>>,
    pub(crate) handler: Arc<ToolHandler>,
}

impl Tool {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON Schema of the arguments object.
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Name sent to providers: `{namespace}_{name}` when namespaced.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}_{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Toolkit field values captured when the tool was created.
    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn state_value(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.qualified_name(),
            self.description.clone(),
            self.parameters.clone(),
        )
    }

    /// Invoke the tool with a JSON arguments object (`null` means no arguments).
    pub fn call(&self, arguments: &Value) -> Result<Value> {
        let mut args = match arguments {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(Error::tool_arguments(
                    format!("expected a JSON object, got {}", other),
                    ErrorContext::new().with_field_path(self.qualified_name()),
                ))
            }
        };
        for (key, value) in &self.defaults {
            args.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self.validate(&args)?;
        tracing::debug!(tool = %self.qualified_name(), "calling tool");
        (self.handler)(args)
    }

    /// Invoke the tool with raw argument JSON, e.g. as assembled from a stream.
    pub fn call_json(&self, raw_arguments: &str) -> Result<Value> {
        let trimmed = raw_arguments.trim();
        let arguments = if trimmed.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(trimmed)?
        };
        self.call(&arguments)
    }

    fn validate(&self, args: &Map<String, Value>) -> Result<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        let instance = Value::Object(args.clone());
        let result = validator.validate(&instance);
        if let Err(errors) = result {
            let details = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::tool_arguments(
                "arguments do not match the parameter schema",
                ErrorContext::new()
                    .with_field_path(self.qualified_name())
                    .with_details(details),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// The tools offered to a single call. Qualified names are unique.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<Tool>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tools(tools: impl IntoIterator<Item = Tool>) -> Result<Self> {
        let mut set = Self::new();
        set.extend(tools)?;
        Ok(set)
    }

    pub fn add(&mut self, tool: Tool) -> Result<()> {
        let name = tool.qualified_name();
        if self.get(&name).is_some() {
            return Err(Error::tool_definition(
                format!("duplicate tool name `{}`", name),
                ErrorContext::new()
                    .with_field_path(name)
                    .with_source("tool_set"),
            ));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn extend(&mut self, tools: impl IntoIterator<Item = Tool>) -> Result<()> {
        for tool in tools {
            self.add(tool)?;
        }
        Ok(())
    }

    /// Look a tool up by its qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<&Tool> {
        self.tools
            .iter()
            .find(|t| t.qualified_name() == qualified_name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    /// Dispatch a model-issued call. String arguments are treated as raw JSON.
    pub fn call(&self, call: &ToolCall) -> Result<Value> {
        let tool = self.require(&call.name)?;
        match &call.arguments {
            Value::String(raw) => tool.call_json(raw),
            arguments => tool.call(arguments),
        }
    }

    pub fn call_streamed(&self, call: &StreamedToolCall) -> Result<Value> {
        self.require(&call.name)?.call_json(&call.arguments)
    }

    /// Dispatch a call and package the outcome (or the failure) as a [`ToolResult`].
    pub fn respond(&self, call: &ToolCall) -> ToolResult {
        match self.call(call) {
            Ok(content) => ToolResult::success(call.id.clone(), content),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                ToolResult::error(call.id.clone(), &e)
            }
        }
    }

    fn require(&self, name: &str) -> Result<&Tool> {
        self.get(name).ok_or_else(|| {
            Error::tool_arguments(
                format!("unknown tool `{}`", name),
                ErrorContext::new().with_field_path(name),
            )
        })
    }
}

impl IntoIterator for ToolSet {
    type Item = Tool;
    type IntoIter = std::vec::IntoIter<Tool>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.into_iter()
    }
}

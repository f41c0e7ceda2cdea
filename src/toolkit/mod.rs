//! Toolkits: families of tools that share state and a namespace.
//!
//! A toolkit is a serializable struct whose tool methods are listed explicitly by
//! [`ToolKit::tool_methods`]. Each method's docstring is a template: `{self.field}`
//! placeholders are filled from the toolkit instance when tools are created, while any other
//! placeholder (`{genre}`) is kept verbatim for a later templating stage.
//!
//! ```rust
//! use ai_lib_calls::tools::{arg, ParamSpec, ParamType, ToolSpec};
//! use ai_lib_calls::toolkit::{NamespaceRegistry, ToolKit, ToolKitDefinition, ToolKitMethod};
//! use serde::Serialize;
//! use serde_json::json;
//!
//! #[derive(Clone, Serialize, schemars::JsonSchema)]
//! struct BookTools {
//!     reading_level: String,
//! }
//!
//! impl ToolKit for BookTools {
//!     fn tool_methods() -> Vec<ToolKitMethod<Self>> {
//!         vec![ToolKitMethod::new(
//!             ToolSpec::new("format_book")
//!                 .doc("Returns the title and author of a book nicely formatted.\n\nReading level: {self.reading_level}")
//!                 .param(ParamSpec::new("title", ParamType::String))
//!                 .param(ParamSpec::new("author", ParamType::String)),
//!             |_kit: &BookTools, args| {
//!                 let title: String = arg(&args, "title")?;
//!                 let author: String = arg(&args, "author")?;
//!                 Ok(json!(format!("{title} by {author}")))
//!             },
//!         )]
//!     }
//! }
//!
//! let registry = NamespaceRegistry::new();
//! let definition = ToolKitDefinition::<BookTools>::define_in(&registry).unwrap();
//! let tools = definition
//!     .create_tools(&BookTools { reading_level: "beginner".into() })
//!     .unwrap();
//! assert!(tools[0].description().ends_with("Reading level: beginner"));
//! ```

pub mod registry;
pub mod template;

pub use registry::NamespaceRegistry;

use crate::tools::docstring::clean_doc;
use crate::tools::schema::json_schema_from_type;
use crate::tools::{Tool, ToolConverter, ToolSpec};
use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

const SELF_PREFIX: &str = "self.";

/// A stateful family of tools.
pub trait ToolKit: Serialize + schemars::JsonSchema + Clone + Send + Sync + 'static {
    /// Namespace prefixed to every tool name. At most one toolkit type may use a namespace.
    const NAMESPACE: Option<&'static str> = None;

    /// The tool-producing methods, in declaration order.
    fn tool_methods() -> Vec<ToolKitMethod<Self>>;

    /// Computed attributes templates may reference in addition to serialized fields.
    fn attribute_names() -> &'static [&'static str] {
        &[]
    }

    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Create this instance's tools using the process-wide definition of the toolkit.
    fn create_tools(&self) -> Result<Vec<Tool>> {
        ToolKitDefinition::<Self>::define()?.create_tools(self)
    }
}

type MethodHandler<K> = dyn Fn(&K, Map<String, Value>) -> Result<Value> + Send + Sync;

/// One tool-producing method of a toolkit: its description plus the function to run.
pub struct ToolKitMethod<K> {
    spec: ToolSpec,
    handler: Arc<MethodHandler<K>>,
}

impl<K> ToolKitMethod<K> {
    pub fn new<F>(spec: ToolSpec, handler: F) -> Self
    where
        F: Fn(&K, Map<String, Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            spec,
            handler: Arc::new(handler),
        }
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }
}

impl<K> Clone for ToolKitMethod<K> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<K> fmt::Debug for ToolKitMethod<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolKitMethod")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// A method that passed definition-time validation.
pub struct ToolKitToolMethod<K> {
    pub method: ToolKitMethod<K>,
    pub template_variables: Vec<String>,
    /// The dedented docstring
    pub template: String,
}

/// The validated shape of a toolkit type.
pub struct ToolKitDefinition<K> {
    namespace: Option<String>,
    methods: Vec<ToolKitToolMethod<K>>,
}

impl<K> fmt::Debug for ToolKitToolMethod<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolKitToolMethod")
            .field("name", &self.method.spec.name)
            .field("template_variables", &self.template_variables)
            .field("template", &self.template)
            .finish()
    }
}

impl<K> fmt::Debug for ToolKitDefinition<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolKitDefinition")
            .field("namespace", &self.namespace)
            .field("methods", &self.methods)
            .finish()
    }
}

static DEFINITIONS: Lazy<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

impl<K: ToolKit> ToolKitDefinition<K> {
    /// The toolkit's definition, validated against the process-wide namespace registry on
    /// first use and cached per type afterwards.
    pub fn define() -> Result<Arc<Self>> {
        let key = TypeId::of::<K>();
        let cached = DEFINITIONS
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned();
        if let Some(any) = cached {
            if let Ok(definition) = any.downcast::<Self>() {
                // The registry may have been reset since the definition was cached.
                if let Some(ns) = definition.namespace() {
                    NamespaceRegistry::global().claim(ns, std::any::type_name::<K>())?;
                }
                return Ok(definition);
            }
        }

        let definition = Arc::new(Self::define_in(NamespaceRegistry::global())?);
        DEFINITIONS
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, definition.clone());
        Ok(definition)
    }

    /// Validate the toolkit type and claim its namespace in `registry`.
    ///
    /// Nothing is registered unless every method validates.
    pub fn define_in(registry: &NamespaceRegistry) -> Result<Self> {
        let toolkit = std::any::type_name::<K>();
        let methods = K::tool_methods();
        if methods.is_empty() {
            return Err(validation_error(toolkit, None, "no toolkit tool method found"));
        }

        let fields = declared_fields::<K>();
        let attributes = K::attribute_names();
        let mut names = HashSet::new();
        let mut validated = Vec::with_capacity(methods.len());

        for method in methods {
            let name = method.spec.name.clone();
            if !names.insert(name.clone()) {
                return Err(validation_error(
                    toolkit,
                    Some(&name),
                    "duplicate toolkit tool method",
                ));
            }

            let doc = method
                .spec
                .doc
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| {
                    validation_error(
                        toolkit,
                        Some(&name),
                        "the toolkit tool method must have a docstring",
                    )
                })?;
            let template = clean_doc(doc);
            let template_variables = template::template_variables(&template)
                .map_err(|m| validation_error(toolkit, Some(&name), &m))?;

            let suffixed = template::suffixed_placeholders(&template)
                .map_err(|m| validation_error(toolkit, Some(&name), &m))?;
            if let Some((field, raw)) = suffixed
                .into_iter()
                .find(|(field, _)| field.starts_with(SELF_PREFIX))
            {
                return Err(validation_error(
                    toolkit,
                    Some(field),
                    &format!(
                        "the toolkit tool method template variable {{{}}} cannot take a conversion or format spec",
                        raw
                    ),
                ));
            }

            for var in &template_variables {
                // Other variables are filled in by a later templating stage.
                let Some(path) = var.strip_prefix(SELF_PREFIX) else {
                    continue;
                };
                let head = attribute_head(path);
                if fields.contains(head) || attributes.iter().any(|a| *a == head) {
                    continue;
                }
                return Err(validation_error(
                    toolkit,
                    Some(var),
                    &format!(
                        "the toolkit tool method template variable {} is not found in the class",
                        var
                    ),
                ));
            }

            validated.push(ToolKitToolMethod {
                method,
                template_variables,
                template,
            });
        }

        let namespace = K::NAMESPACE.filter(|ns| !ns.is_empty());
        if let Some(ns) = namespace {
            registry.claim(ns, toolkit)?;
        }

        tracing::debug!(
            toolkit,
            namespace = ?namespace,
            methods = validated.len(),
            "defined toolkit"
        );
        Ok(Self {
            namespace: namespace.map(str::to_string),
            methods: validated,
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn methods(&self) -> &[ToolKitToolMethod<K>] {
        &self.methods
    }

    pub fn create_tools(&self, kit: &K) -> Result<Vec<Tool>> {
        self.create_tools_with(kit, &ToolConverter::default())
    }

    /// Build one tool per method, in declaration order, from the live state of `kit`.
    pub fn create_tools_with(&self, kit: &K, converter: &ToolConverter) -> Result<Vec<Tool>> {
        let toolkit = std::any::type_name::<K>();
        let fields = match serde_json::to_value(kit)? {
            Value::Object(map) => map,
            // Unit structs carry no state.
            Value::Null => Map::new(),
            other => {
                return Err(Error::toolkit_validation(
                    "a toolkit must serialize to a JSON object",
                    ErrorContext::new()
                        .with_field_path(toolkit)
                        .with_details(format!("serialized to {}", other)),
                ))
            }
        };
        let shared = Arc::new(kit.clone());

        let mut tools = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            let name = &method.method.spec.name;
            // Escape first so only `self.` variables are substituted by the render pass.
            let escaped =
                template::escape_placeholders(&method.template, |f| !f.starts_with(SELF_PREFIX))
                    .map_err(|m| validation_error(toolkit, Some(name), &m))?;
            let rendered = template::render(&escaped, |field| {
                let path = field.strip_prefix(SELF_PREFIX)?;
                resolve_self(path, &fields, kit).map(|v| display_value(&v))
            })
            .map_err(|m| validation_error(toolkit, Some(name), &m))?;

            let handler = Arc::clone(&method.method.handler);
            let instance = Arc::clone(&shared);
            let mut tool = converter.convert_spec(
                method.method.spec.clone(),
                Some(&rendered),
                self.namespace.as_deref(),
                Arc::new(move |args: Map<String, Value>| handler(instance.as_ref(), args)),
            )?;
            tool.state = fields.clone();
            tools.push(tool);
        }

        tracing::debug!(toolkit, count = tools.len(), "created toolkit tools");
        Ok(tools)
    }
}

fn declared_fields<K: ToolKit>() -> HashSet<String> {
    json_schema_from_type::<K>()
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

fn attribute_head(path: &str) -> &str {
    path.split(|c: char| c == '.' || c == '[')
        .next()
        .unwrap_or(path)
}

fn resolve_self<K: ToolKit>(path: &str, fields: &Map<String, Value>, kit: &K) -> Option<Value> {
    let path = path.replace('[', ".").replace(']', "");
    let mut segments = path.split('.');
    let head = segments.next()?;
    let mut value = fields.get(head).cloned().or_else(|| kit.attribute(head))?;
    for segment in segments {
        value = match value {
            Value::Object(mut map) => map.remove(segment)?,
            Value::Array(mut items) => {
                let idx: usize = segment.parse().ok()?;
                if idx >= items.len() {
                    return None;
                }
                items.swap_remove(idx)
            }
            _ => return None,
        };
    }
    Some(value)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn validation_error(toolkit: &str, field: Option<&str>, message: &str) -> Error {
    let mut context = ErrorContext::new()
        .with_source("toolkit_definition")
        .with_details(toolkit);
    if let Some(field) = field {
        context = context.with_field_path(field);
    }
    Error::toolkit_validation(message, context)
}

//! Conversion of described callables into [`Tool`]s.

use super::docstring::{parse_docstring, ParsedDocstring};
use super::schema::{json_schema_from_type, SchemaGenerator};
use super::{Describable, Tool, ToolHandler, ToolModel, ToolSpec};
use crate::{Error, ErrorContext, Result};
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Description used when a tool documents nothing and descriptions are not required.
pub const DEFAULT_TOOL_DESCRIPTION: &str = "Correctly formatted and typed parameters extracted from the completion. \
Must include required parameters and may exclude optional parameters unless present in the text.";

static TOOL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("tool name pattern is valid"));

/// How strict conversion is about documentation and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Fail when a tool has no description instead of using the default one
    pub require_description: bool,
    /// Fail when any parameter lacks a description
    pub require_parameter_docs: bool,
    /// Validate call arguments against the parameter schema
    pub validate_arguments: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            require_description: false,
            require_parameter_docs: false,
            validate_arguments: true,
        }
    }
}

/// Turns [`Describable`] values and [`ToolModel`] types into [`Tool`]s.
#[derive(Debug, Clone, Default)]
pub struct ToolConverter {
    config: ConverterConfig,
}

impl ToolConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a described callable.
    ///
    /// `template` replaces the described docstring when given (toolkits pass their rendered
    /// template here). `namespace` tags the tool and prefixes its provider-facing name.
    pub fn convert<D, F>(
        &self,
        describable: &D,
        template: Option<&str>,
        namespace: Option<&str>,
        handler: F,
    ) -> Result<Tool>
    where
        D: Describable + ?Sized,
        F: Fn(Map<String, Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.convert_spec(describable.describe(), template, namespace, Arc::new(handler))
    }

    pub(crate) fn convert_spec(
        &self,
        spec: ToolSpec,
        template: Option<&str>,
        namespace: Option<&str>,
        handler: Arc<ToolHandler>,
    ) -> Result<Tool> {
        validate_name(&spec.name)?;

        let mut seen = HashSet::new();
        for param in &spec.params {
            if !seen.insert(param.name.as_str()) {
                return Err(definition_error(
                    &spec.name,
                    Some(&param.name),
                    "duplicate parameter",
                ));
            }
        }

        let doc = template.or(spec.doc.as_deref());
        let parsed = match doc.filter(|d| !d.trim().is_empty()) {
            Some(doc) => {
                parse_docstring(doc).map_err(|m| definition_error(&spec.name, None, &m))?
            }
            None => ParsedDocstring::default(),
        };

        for (documented, _) in &parsed.params {
            if documented.starts_with('*') {
                continue;
            }
            if !seen.contains(documented.as_str()) {
                return Err(definition_error(
                    &spec.name,
                    Some(documented),
                    "docstring documents an undeclared parameter",
                ));
            }
        }

        let description = self.description_or_default(&spec.name, parsed.description.clone())?;

        let mut schema = SchemaGenerator::new();
        let mut defaults = Map::new();
        for param in &spec.params {
            let mut property = param.kind.to_schema();
            let param_doc = param
                .description
                .as_deref()
                .or_else(|| parsed.param(&param.name));
            match (param_doc, property.as_object_mut()) {
                (Some(text), Some(obj)) => {
                    obj.insert("description".into(), Value::String(text.to_string()));
                }
                (None, _) if self.config.require_parameter_docs => {
                    return Err(definition_error(
                        &spec.name,
                        Some(&param.name),
                        "parameter has no description",
                    ));
                }
                _ => {}
            }
            match &param.default {
                Some(default) => {
                    if let Some(obj) = property.as_object_mut() {
                        obj.insert("default".into(), default.clone());
                    }
                    defaults.insert(param.name.clone(), default.clone());
                }
                None => schema = schema.add_required(param.name.clone()),
            }
            schema = schema.add_property(param.name.clone(), property);
        }

        self.finish(
            spec.name,
            description,
            schema.build(),
            namespace,
            defaults,
            handler,
        )
    }

    /// Convert a [`ToolModel`] type. The tool is named after the type.
    pub fn convert_model<T: ToolModel>(&self, namespace: Option<&str>) -> Result<Tool> {
        let name = T::schema_name();
        validate_name(&name)?;

        let mut parameters = json_schema_from_type::<T>();
        let obj = parameters.as_object_mut().ok_or_else(|| {
            definition_error(&name, None, "type does not produce an object schema")
        })?;
        obj.remove("$schema");
        obj.remove("title");
        let doc = obj
            .remove("description")
            .and_then(|d| d.as_str().map(str::to_string))
            .unwrap_or_default();
        let description = self.description_or_default(&name, doc)?;

        if self.config.require_parameter_docs {
            if let Some(props) = obj.get("properties").and_then(Value::as_object) {
                if let Some((undocumented, _)) = props
                    .iter()
                    .find(|(_, schema)| schema.get("description").is_none())
                {
                    return Err(definition_error(
                        &name,
                        Some(undocumented),
                        "parameter has no description",
                    ));
                }
            }
        }

        let handler = |args: Map<String, Value>| -> Result<Value> {
            let model: T = serde_json::from_value(Value::Object(args)).map_err(|e| {
                Error::tool_arguments(
                    format!("arguments do not deserialize into the tool: {}", e),
                    ErrorContext::new().with_field_path(T::schema_name()),
                )
            })?;
            model.call()
        };

        self.finish(
            name,
            description,
            parameters,
            namespace,
            Map::new(),
            Arc::new(handler),
        )
    }

    fn description_or_default(&self, tool: &str, description: String) -> Result<String> {
        if !description.trim().is_empty() {
            return Ok(description);
        }
        if self.config.require_description {
            return Err(definition_error(tool, None, "tool has no description"));
        }
        Ok(DEFAULT_TOOL_DESCRIPTION.to_string())
    }

    fn finish(
        &self,
        name: String,
        description: String,
        parameters: Value,
        namespace: Option<&str>,
        defaults: Map<String, Value>,
        handler: Arc<ToolHandler>,
    ) -> Result<Tool> {
        let validator = if self.config.validate_arguments {
            let compiled = JSONSchema::options()
                .with_draft(Draft::Draft7)
                .compile(&parameters)
                .map_err(|e| {
                    definition_error(&name, None, &format!("invalid parameter schema: {}", e))
                })?;
            Some(Arc::new(compiled))
        } else {
            None
        };

        tracing::debug!(tool = %name, namespace = ?namespace, "converted tool");
        Ok(Tool {
            name,
            description,
            parameters,
            namespace: namespace.map(str::to_string),
            defaults,
            state: Map::new(),
            validator,
            handler,
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if TOOL_NAME.is_match(name) {
        Ok(())
    } else {
        Err(definition_error(
            name,
            None,
            "tool names must be 1-64 characters of letters, digits, `_` or `-`",
        ))
    }
}

fn definition_error(tool: &str, param: Option<&str>, message: &str) -> Error {
    let path = match param {
        Some(p) => format!("{}.{}", tool, p),
        None => tool.to_string(),
    };
    Error::tool_definition(
        message,
        ErrorContext::new()
            .with_field_path(path)
            .with_source("tool_converter"),
    )
}

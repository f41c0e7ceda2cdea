use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Tool, parameter or template variable that caused the error (e.g., "format_book.title", "self.reading_level")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "tool_converter", "toolkit_definition")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the call core.
///
/// Every variant is raised synchronously where the misuse happens: input errors at
/// normalization time, schema and namespace errors at definition time. Nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {message}: {value} (type: {type_name})")]
    InvalidInput {
        message: String,
        value: String,
        type_name: String,
    },

    #[error("Tool definition error: {message}{}", format_context(.context))]
    ToolDefinition {
        message: String,
        context: ErrorContext,
    },

    #[error("Toolkit validation error: {message}{}", format_context(.context))]
    ToolKitValidation {
        message: String,
        context: ErrorContext,
    },

    #[error("Namespace collision: the namespace `{namespace}` is already used by {owner}")]
    NamespaceCollision { namespace: String, owner: String },

    #[error("Tool argument error: {message}{}", format_context(.context))]
    ToolArguments {
        message: String,
        context: ErrorContext,
    },

    #[error("Tool execution error: {message}{}", format_context(.context))]
    ToolExecution {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// The top-level input handed to the normalizer has an unsupported shape.
    pub fn invalid_messages(value: impl Into<String>, type_name: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: "Invalid messages type".to_string(),
            value: value.into(),
            type_name: type_name.into(),
        }
    }

    /// A message role was given as the empty string.
    pub fn empty_role() -> Self {
        Error::InvalidInput {
            message: "message role must not be empty".to_string(),
            value: "\"\"".to_string(),
            type_name: "role".to_string(),
        }
    }

    /// One element of a message sequence could not become a content part.
    pub fn invalid_sequence_part(value: impl Into<String>, type_name: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: "Invalid message sequence type".to_string(),
            value: value.into(),
            type_name: type_name.into(),
        }
    }

    pub fn tool_definition(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::ToolDefinition {
            message: msg.into(),
            context,
        }
    }

    pub fn toolkit_validation(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::ToolKitValidation {
            message: msg.into(),
            context,
        }
    }

    pub fn tool_arguments(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::ToolArguments {
            message: msg.into(),
            context,
        }
    }

    /// Convenience for tool handlers that want to report a failure to the caller.
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Error::ToolExecution {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::ToolDefinition { context, .. }
            | Error::ToolKitValidation { context, .. }
            | Error::ToolArguments { context, .. }
            | Error::ToolExecution { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}

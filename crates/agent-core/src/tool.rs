//! Tool System
//!
//! Tools are registered once at startup and invoked by name from the
//! reasoning loop. The registry keeps registration order, which is the order
//! schemas are advertised to the model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: HashMap<String, Value>,

    /// Call ID for pairing the result with the request
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    /// Build a call from a JSON value; non-object arguments become an empty map
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self {
            name: name.into(),
            arguments,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// String argument, ignoring blanks
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Boolean argument; accepts `true`/`false` strings as well
    pub fn bool_arg(&self, key: &str) -> Option<bool> {
        match self.arguments.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Unsigned integer argument; accepts numeric strings as well
    pub fn u64_arg(&self, key: &str) -> Option<u64> {
        match self.arguments.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (formatted text or error description)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, integer, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    pub fn required(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
            enum_values: None,
        }
    }

    pub fn optional(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    fn json_schema(&self) -> Value {
        let mut schema = serde_json::json!({
            "description": self.description,
        });
        // "string|array" style unions become a JSON Schema type list
        let types: Vec<&str> = self.param_type.split('|').map(str::trim).collect();
        let has_array = types.contains(&"array");
        schema["type"] = if types.len() == 1 {
            Value::from(types[0])
        } else {
            Value::from(types)
        };
        if has_array {
            schema["items"] = serde_json::json!({"type": "string"});
        }
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        if let Some(values) = &self.enum_values {
            schema["enum"] = Value::Array(values.clone());
        }
        schema
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions, in declaration order
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// JSON Schema object describing the parameters
    pub fn parameters_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AgentError::Config("Tool name must not be empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(AgentError::Config(format!(
                    "Tool '{}' declares parameter '{}' twice",
                    self.name, param.name
                )));
            }
        }
        Ok(())
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, schema: &ToolSchema, call: &ToolCall) -> Result<()> {
        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

struct Registered {
    schema: ToolSchema,
    tool: Arc<dyn Tool>,
}

/// Registry for available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Registered>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool; rejects malformed schemas and duplicate names
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_shared(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let schema = tool.schema();
        schema.check()?;
        if self.index.contains_key(&schema.name) {
            return Err(AgentError::Config(format!(
                "Tool '{}' registered twice",
                schema.name
            )));
        }
        self.index.insert(schema.name.clone(), self.tools.len());
        self.tools.push(Registered { schema, tool });
        Ok(())
    }

    /// Build a registry from an ordered tool set
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register_shared(tool)?;
        }
        Ok(registry)
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].tool.clone())
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let entry = self
            .index
            .get(&call.name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        entry.tool.validate(&entry.schema, call)?;
        entry.tool.execute(call).await
    }

    /// All tool schemas, in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema.clone()).collect()
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.schema.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.0.into(),
                description: "Echo the input".into(),
                parameters: vec![ParameterSchema::required("text", "string", "Text to echo")],
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success(self.0, call.str_arg("text").unwrap_or_default()))
        }
    }

    #[test]
    fn test_tool_registry_keeps_order() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool("beta")).unwrap();
        registry.register(EchoTool("alpha")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["beta", "alpha"]);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool("echo")).unwrap();
        let err = registry.register(EchoTool("echo")).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[tokio::test]
    async fn test_execute_validates_required_params() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool("echo")).unwrap();

        let missing = ToolCall::new("echo", serde_json::json!({}));
        assert!(matches!(
            registry.execute(&missing).await,
            Err(AgentError::ToolValidation(_))
        ));

        let call = ToolCall::new("echo", serde_json::json!({"text": "hi"}));
        let result = registry.execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hi");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall::new("nope", serde_json::json!({}));
        assert!(matches!(
            registry.execute(&call).await,
            Err(AgentError::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_argument_coercion() {
        let call = ToolCall::new(
            "t",
            serde_json::json!({"n": "7", "flag": "true", "blank": "  ", "m": 3}),
        );
        assert_eq!(call.u64_arg("n"), Some(7));
        assert_eq!(call.u64_arg("m"), Some(3));
        assert_eq!(call.bool_arg("flag"), Some(true));
        assert_eq!(call.str_arg("blank"), None);
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = ToolSchema {
            name: "web_extract".into(),
            description: "Extract".into(),
            parameters: vec![
                ParameterSchema::required("urls", "string|array", "URLs"),
                ParameterSchema::optional("extract_depth", "string", "Depth")
                    .with_default(serde_json::json!("basic"))
                    .with_enum(vec![serde_json::json!("basic"), serde_json::json!("advanced")]),
            ],
        };

        let json = schema.parameters_json_schema();
        assert_eq!(json["required"], serde_json::json!(["urls"]));
        assert_eq!(json["properties"]["urls"]["type"], serde_json::json!(["string", "array"]));
        assert_eq!(json["properties"]["urls"]["items"]["type"], "string");
        assert!(json["properties"]["extract_depth"].get("items").is_none());
        assert_eq!(json["properties"]["extract_depth"]["default"], "basic");
        assert_eq!(json["properties"]["extract_depth"]["enum"][1], "advanced");
    }
}

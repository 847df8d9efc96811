use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use utoipa::ToSchema;

/// Who produced a turn in the conversation ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConversationRole {
    User,
    Assistant,
    ToolResult,
}

impl ConversationRole {
    /// Prefix used when the turn is rendered into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            ConversationRole::User => "User",
            ConversationRole::Assistant => "Assistant",
            ConversationRole::ToolResult => "Result",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConversationTurn {
    pub role: ConversationRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(role: ConversationRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ConversationRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ConversationRole::Assistant, text)
    }

    pub fn tool_result(text: impl Into<String>) -> Self {
        Self::new(ConversationRole::ToolResult, text)
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.role.label(), self.text)
    }
}

/// A tool as declared by the provider in `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub parameter_schema: Option<Value>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.parameter_schema = Some(schema);
        self
    }

    /// Parse one entry of an MCP `tools/list` result.
    pub fn from_mcp(value: &Value) -> Option<Self> {
        let name = value.get("name").and_then(Value::as_str)?.trim();
        if name.is_empty() {
            return None;
        }
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parameter_schema = value
            .get("inputSchema")
            .filter(|schema| declares_parameters(schema))
            .cloned();
        Some(Self {
            name: name.to_string(),
            description,
            parameter_schema,
        })
    }
}

/// A schema only counts as explicit when it names at least one property.
fn declares_parameters(schema: &Value) -> bool {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| !properties.is_empty())
        .unwrap_or(false)
}

/// The shape handed to the model's function-calling API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl FunctionDeclaration {
    /// Names of the parameters listed in the schema's `required` array.
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.parameters
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// A model-requested call to a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Renders the arguments as `{page: 2, query: "shoes"}`.
    pub fn render_arguments(&self) -> String {
        let pairs = self
            .arguments
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>();
        format!("{{{}}}", pairs.join(", "))
    }

    /// Ledger line describing the dispatched call.
    pub fn summary(&self) -> String {
        format!(
            "Executed {} with args {}",
            self.tool_name,
            self.render_arguments()
        )
    }
}

/// Tool output as returned by the provider, kept structured until it has to
/// be shown as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<ToolValue>),
    Mapping(BTreeMap<String, ToolValue>),
}

impl ToolValue {
    pub fn get(&self, key: &str) -> Option<&ToolValue> {
        match self {
            ToolValue::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToolValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ToolValue]> {
        match self {
            ToolValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.clone())
    }

    /// Display text for the ledger.
    ///
    /// MCP results carry their payload in `content` blocks; text blocks are
    /// joined line by line. Anything else falls back to compact JSON, and a
    /// bare string is shown without quotes.
    pub fn display_text(&self) -> String {
        if let Some(blocks) = self.get("content").and_then(ToolValue::as_sequence) {
            let texts = blocks
                .iter()
                .filter(|block| block.get("type").and_then(ToolValue::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(ToolValue::as_str))
                .collect::<Vec<_>>();
            if !texts.is_empty() {
                return texts.join("\n");
            }
        }
        match self {
            ToolValue::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ToolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<Value> for ToolValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ToolValue::Null,
            Value::Bool(flag) => ToolValue::Bool(flag),
            Value::Number(number) => ToolValue::Number(number),
            Value::String(text) => ToolValue::String(text),
            Value::Array(items) => {
                ToolValue::Sequence(items.into_iter().map(ToolValue::from).collect())
            }
            Value::Object(map) => ToolValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, ToolValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<ToolValue> for Value {
    fn from(value: ToolValue) -> Self {
        match value {
            ToolValue::Null => Value::Null,
            ToolValue::Bool(flag) => Value::Bool(flag),
            ToolValue::Number(number) => Value::Number(number),
            ToolValue::String(text) => Value::String(text),
            ToolValue::Sequence(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            ToolValue::Mapping(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Lifecycle of a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Ready,
    Closed,
}

impl SessionStatus {
    pub fn is_ready(self) -> bool {
        matches!(self, SessionStatus::Ready)
    }
}

/// How to start a tool-provider process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchSpec {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl LaunchSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Short name used in log fields and error messages.
    pub fn label(&self) -> String {
        let program = Path::new(&self.command)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.command.as_str());
        match self.args.last() {
            Some(last) => format!("{program} {last}"),
            None => program.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invocation_summary_lists_arguments_without_quoted_keys() {
        let mut args = Map::new();
        args.insert("page".into(), json!(2));
        let invocation = ToolInvocation::new("get_products", args);
        assert_eq!(
            invocation.summary(),
            "Executed get_products with args {page: 2}"
        );
        assert_eq!(
            ToolInvocation::new("ping", Map::new()).summary(),
            "Executed ping with args {}"
        );
    }

    #[test]
    fn descriptor_treats_empty_input_schema_as_absent() {
        let declared = json!({
            "name": "login",
            "description": "Sign in",
            "inputSchema": {"type": "object", "properties": {}}
        });
        let descriptor = ToolDescriptor::from_mcp(&declared).expect("descriptor");
        assert_eq!(descriptor.name, "login");
        assert!(descriptor.parameter_schema.is_none());

        let explicit = json!({
            "name": "search",
            "inputSchema": {"type": "object", "properties": {"q": {"type": "string"}}}
        });
        let descriptor = ToolDescriptor::from_mcp(&explicit).expect("descriptor");
        assert_eq!(descriptor.description, "");
        assert!(descriptor.parameter_schema.is_some());

        assert!(ToolDescriptor::from_mcp(&json!({"description": "nameless"})).is_none());
    }

    #[test]
    fn tool_value_prefers_text_content_blocks() {
        let value = ToolValue::from(json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "image", "data": "..."},
                {"type": "text", "text": "second"}
            ],
            "isError": false
        }));
        assert_eq!(value.display_text(), "first\nsecond");

        let structured = ToolValue::from(json!({"total": 3, "items": [1, 2, 3]}));
        assert_eq!(structured.display_text(), r#"{"items":[1,2,3],"total":3}"#);
        assert_eq!(ToolValue::from(json!("plain")).display_text(), "plain");
    }

    #[test]
    fn tool_value_round_trips_through_json() {
        let original = json!({"nested": {"flag": true, "none": null}, "list": ["a", 1.5]});
        let value = ToolValue::from(original.clone());
        assert_eq!(value.to_json(), original);
    }

    #[test]
    fn launch_label_uses_program_and_last_argument() {
        let launch = LaunchSpec::new("/usr/bin/python3").with_args(["-u", "server.py"]);
        assert_eq!(launch.label(), "python3 server.py");
        assert_eq!(LaunchSpec::new("npx").label(), "npx");
    }
}

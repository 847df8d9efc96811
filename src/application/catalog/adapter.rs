use super::fallback::FallbackTable;
use crate::types::{FunctionDeclaration, ToolDescriptor};
use serde_json::{Map, Value};

/// JSON Schema keywords the function-calling API refuses.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$defs",
    "definitions",
    "additionalProperties",
];

/// Converts provider tool descriptors into function declarations.
#[derive(Debug, Clone, Default)]
pub struct SchemaAdapter {
    fallback: FallbackTable,
}

impl SchemaAdapter {
    pub fn new(fallback: FallbackTable) -> Self {
        Self { fallback }
    }

    pub fn adapt(&self, tool: &ToolDescriptor) -> FunctionDeclaration {
        let parameters = match &tool.parameter_schema {
            Some(schema) => sanitize_schema(schema),
            None => self.fallback.shape_for(&tool.name).to_schema(),
        };
        FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters,
        }
    }

    /// Adapts every tool; a repeated name overwrites the earlier declaration
    /// in place.
    pub fn adapt_all<'a, I>(&self, tools: I) -> Vec<FunctionDeclaration>
    where
        I: IntoIterator<Item = &'a ToolDescriptor>,
    {
        let mut declarations: Vec<FunctionDeclaration> = Vec::new();
        for tool in tools {
            let declaration = self.adapt(tool);
            match declarations
                .iter_mut()
                .find(|existing| existing.name == declaration.name)
            {
                Some(existing) => *existing = declaration,
                None => declarations.push(declaration),
            }
        }
        declarations
    }
}

/// Strips unsupported keywords at every depth and makes sure the root is an object schema.
pub fn sanitize_schema(schema: &Value) -> Value {
    let mut cleaned = strip_unsupported(schema);
    if let Value::Object(map) = &mut cleaned {
        map.entry("type")
            .or_insert_with(|| Value::String("object".into()));
    }
    cleaned
}

fn strip_unsupported(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .iter()
                .filter(|(key, _)| !UNSUPPORTED_KEYWORDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), strip_unsupported(value)))
                .collect();
            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(items.iter().map(strip_unsupported).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_without_schema_requires_username_and_password() {
        let adapter = SchemaAdapter::default();
        let declaration = adapter.adapt(&ToolDescriptor::new("login", "Sign in"));

        assert_eq!(declaration.name, "login");
        assert_eq!(declaration.description, "Sign in");
        assert_eq!(declaration.required(), vec!["username", "password"]);
        let mut properties = declaration.property_names();
        properties.sort_unstable();
        assert_eq!(properties, vec!["password", "username"]);
        assert_eq!(declaration.parameters["properties"]["username"]["type"], "string");
        assert_eq!(declaration.parameters["properties"]["password"]["type"], "string");
    }

    #[test]
    fn other_tools_without_schema_take_no_parameters() {
        let adapter = SchemaAdapter::default();
        let declaration = adapter.adapt(&ToolDescriptor::new("list_students", "All students"));
        assert!(declaration.property_names().is_empty());
        assert!(declaration.required().is_empty());
        assert_eq!(declaration.parameters["type"], "object");
    }

    #[test]
    fn explicit_schema_wins_and_is_sanitized() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "properties": {
                "filter": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {"grade": {"type": "string"}}
                }
            },
            "required": ["filter"]
        });
        let adapter = SchemaAdapter::default();
        let declaration = adapter.adapt(&ToolDescriptor::new("login", "custom").with_schema(schema));

        assert_eq!(declaration.required(), vec!["filter"]);
        assert_eq!(declaration.parameters["type"], "object");
        assert!(declaration.parameters.get("$schema").is_none());
        assert!(
            declaration.parameters["properties"]["filter"]
                .get("additionalProperties")
                .is_none()
        );
    }

    #[test]
    fn later_duplicate_overrides_earlier_in_place() {
        let adapter = SchemaAdapter::default();
        let tools = vec![
            ToolDescriptor::new("echo", "first"),
            ToolDescriptor::new("login", "auth"),
            ToolDescriptor::new("echo", "second"),
        ];
        let declarations = adapter.adapt_all(&tools);
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].name, "echo");
        assert_eq!(declarations[0].description, "second");
        assert_eq!(declarations[1].name, "login");
    }
}

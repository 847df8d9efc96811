use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParameterKind {
    pub fn json_type(self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Integer => "integer",
            ParameterKind::Number => "number",
            ParameterKind::Boolean => "boolean",
        }
    }
}

/// One parameter of a fallback shape, as written in `[[fallback_schemas.parameters]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, kind: ParameterKind, description: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            description: Some(description.to_string()),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParameterKind, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// The parameter list assumed for a tool whose provider declared none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterShape {
    parameters: Vec<ParameterSpec>,
}

impl ParameterShape {
    pub fn new(parameters: Vec<ParameterSpec>) -> Self {
        Self { parameters }
    }

    pub fn to_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for parameter in &self.parameters {
            let mut property = Map::new();
            property.insert("type".into(), json!(parameter.kind.json_type()));
            if let Some(description) = &parameter.description {
                property.insert("description".into(), json!(description));
            }
            properties.insert(parameter.name.clone(), Value::Object(property));
            if parameter.required {
                required.push(json!(parameter.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Name-keyed parameter shapes used when a provider omits `inputSchema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    entries: HashMap<String, ParameterShape>,
}

impl FallbackTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the shape previously registered under `name`, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        shape: ParameterShape,
    ) -> Option<ParameterShape> {
        self.entries.insert(name.into(), shape)
    }

    /// Shape for `name`, or zero parameters when the table has no entry.
    pub fn shape_for(&self, name: &str) -> ParameterShape {
        self.entries.get(name).cloned().unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(
            "login",
            ParameterShape::new(vec![
                ParameterSpec::required("username", ParameterKind::String, "Username for login"),
                ParameterSpec::required("password", ParameterKind::String, "Password for login"),
            ]),
        );
        table.insert(
            "get_products",
            ParameterShape::new(vec![
                ParameterSpec::optional("page", ParameterKind::Integer, "Page number for pagination"),
                ParameterSpec::optional("limit", ParameterKind::Integer, "Number of items per page"),
            ]),
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_knows_login_and_products() {
        let table = FallbackTable::default();
        assert_eq!(table.names(), vec!["get_products", "login"]);

        let products = table.shape_for("get_products").to_schema();
        assert_eq!(products["properties"]["page"]["type"], "integer");
        assert_eq!(products["properties"]["limit"]["type"], "integer");
        assert_eq!(products["required"], json!([]));
    }

    #[test]
    fn unknown_names_get_an_empty_shape() {
        let schema = FallbackTable::default().shape_for("weather").to_schema();
        assert_eq!(
            schema,
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn insert_replaces_existing_shape() {
        let mut table = FallbackTable::default();
        let previous = table.insert(
            "login",
            ParameterShape::new(vec![ParameterSpec::required(
                "token",
                ParameterKind::String,
                "Session token",
            )]),
        );
        assert!(previous.is_some());
        assert_eq!(table.len(), 2);
        let schema = table.shape_for("login").to_schema();
        assert_eq!(schema["required"], json!(["token"]));
    }
}

//! Gemini client implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::env;
use tracing::{debug, info, warn};

use super::base::HttpClientBase;
use crate::config::ModelConfig;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{GenerationRequest, GenerationResponse, ModelError};
use crate::types::{FunctionDeclaration, ToolInvocation};

const PROVIDER_ID: &str = "gemini";

/// Gemini client for Google AI
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
    api_path: String,
}

impl GeminiClient {
    /// Fails only when the HTTP client cannot be built with the configured timeout.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = resolve_api_key(&config.api_key_env);
        Ok(Self {
            base: HttpClientBase::new(
                PROVIDER_ID.to_string(),
                config.endpoint.clone(),
                api_key,
                config.request_timeout(),
            )?,
            api_path: config.api_path.trim_matches('/').to_string(),
        })
    }

    fn build_model_url(&self, model: &str) -> String {
        self.base
            .build_url(&format!("{}/{model}:generateContent", self.api_path))
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ModelError> {
        let url = self.build_model_url(&request.model);
        let payload = build_payload(&request);

        info!(
            provider = PROVIDER_ID,
            model = request.model.as_str(),
            functions = request.functions.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self
            .base
            .post_with_query_key(&url, &payload, request.api_key.as_deref())
            .await?;
        debug!("Received response from Gemini");

        parse_response(response)
    }
}

fn resolve_api_key(env_var: &str) -> Option<String> {
    let name = env_var.trim();
    if name.is_empty() {
        return None;
    }
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            debug!(env_var = name, "API key environment variable is not set");
            None
        }
    }
}

fn build_payload(request: &GenerationRequest) -> Value {
    let mut payload = json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": request.prompt}]
        }],
        "generationConfig": {
            "temperature": request.temperature
        }
    });
    if !request.functions.is_empty() {
        let declarations: Vec<Value> = request.functions.iter().map(declaration_json).collect();
        payload["tools"] = json!([{ "functionDeclarations": declarations }]);
    }
    payload
}

/// Gemini refuses object schemas without properties, so parameterless
/// functions are sent without `parameters`.
fn declaration_json(declaration: &FunctionDeclaration) -> Value {
    let mut entry = json!({
        "name": declaration.name,
        "description": declaration.description,
    });
    if !declaration.property_names().is_empty() {
        entry["parameters"] = declaration.parameters.clone();
    }
    entry
}

fn parse_response(response: GeminiResponse) -> Result<GenerationResponse, ModelError> {
    let parts = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .ok_or_else(|| ModelError::invalid_response(PROVIDER_ID, "missing candidates"))?;

    if let Some(call) = parts.iter().find_map(|part| part.function_call.as_ref()) {
        let arguments = match &call.args {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                warn!(args = %other, "function call arguments are not an object");
                Map::new()
            }
        };
        return Ok(GenerationResponse::function_call(ToolInvocation::new(
            call.name.clone(),
            arguments,
        )));
    }

    let texts: Vec<&str> = parts.iter().filter_map(|part| part.text.as_deref()).collect();
    if texts.is_empty() {
        return Err(ModelError::invalid_response(PROVIDER_ID, "missing text"));
    }
    Ok(GenerationResponse::text(texts.concat()))
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn response(body: Value) -> GeminiResponse {
        serde_json::from_value(body).expect("valid gemini response")
    }

    fn request(functions: Vec<FunctionDeclaration>) -> GenerationRequest {
        GenerationRequest {
            model: "gemini-2.0-flash".into(),
            prompt: "list products page 2".into(),
            temperature: 0.0,
            functions,
            api_key: None,
        }
    }

    #[test]
    fn builds_model_url_from_config() {
        let client = GeminiClient::from_config(&ModelConfig::default()).expect("client builds");
        assert_eq!(
            client.build_model_url("gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_timeout_comes_from_config() {
        let config = ModelConfig {
            request_timeout_secs: 7,
            ..ModelConfig::default()
        };
        let client = GeminiClient::from_config(&config).expect("client builds");
        assert_eq!(client.base.timeout, Duration::from_secs(7));
    }

    #[test]
    fn payload_omits_tools_when_no_functions() {
        let payload = build_payload(&request(Vec::new()));
        assert!(payload.get("tools").is_none());
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "list products page 2");
        assert_eq!(payload["generationConfig"]["temperature"], 0.0);
    }

    #[test]
    fn payload_drops_empty_parameter_objects() {
        let payload = build_payload(&request(vec![
            FunctionDeclaration {
                name: "ping".into(),
                description: "Ping".into(),
                parameters: json!({"type": "object", "properties": {}, "required": []}),
            },
            FunctionDeclaration {
                name: "get_products".into(),
                description: "Products".into(),
                parameters: json!({"type": "object", "properties": {"page": {"type": "integer"}}}),
            },
        ]));
        let declarations = &payload["tools"][0]["functionDeclarations"];
        assert!(declarations[0].get("parameters").is_none());
        assert_eq!(
            declarations[1]["parameters"]["properties"]["page"]["type"],
            "integer"
        );
    }

    #[test]
    fn function_call_part_wins_over_text() {
        let parsed = parse_response(response(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Let me check."},
                    {"functionCall": {"name": "get_products", "args": {"page": 2}}}
                ]}
            }]
        })))
        .expect("parsed");
        let call = parsed.function_call.expect("function call");
        assert_eq!(call.tool_name, "get_products");
        assert_eq!(call.arguments.get("page"), Some(&json!(2)));
    }

    #[test]
    fn text_parts_are_joined() {
        let parsed = parse_response(response(json!({
            "candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}]
        })))
        .expect("parsed");
        assert_eq!(parsed.text, "Hello, world");
        assert!(parsed.function_call.is_none());
    }

    #[test]
    fn empty_candidates_are_invalid() {
        let err = parse_response(response(json!({"candidates": []}))).unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse { .. }));
    }
}

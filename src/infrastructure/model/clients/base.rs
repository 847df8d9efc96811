//! Base HTTP client with shared logic

use crate::infrastructure::model::types::ModelError;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Base HTTP client with shared functionality
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(
        id: String,
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::client(&id, e))?;
        Ok(Self {
            id,
            endpoint,
            api_key,
            timeout,
            http,
        })
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Post JSON with the key as a query parameter. `override_key` wins over
    /// the key the client was built with.
    pub async fn post_with_query_key<Req, Res>(
        &self,
        url: &str,
        body: &Req,
        override_key: Option<&str>,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let api_key = self.require_api_key(override_key)?;

        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;

        self.ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(&self.id, e.to_string()))
    }

    /// Turns a non-2xx reply into `ModelError::Api`, keeping the provider's
    /// own `error.message` when the body carries one.
    async fn ensure_success(&self, response: Response) -> Result<Response, ModelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ModelError::api(&self.id, status, error_message(&body)))
    }

    fn require_api_key<'a>(&'a self, override_key: Option<&'a str>) -> Result<&'a str, ModelError> {
        override_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.as_deref().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| ModelError::missing_api_key(&self.id))
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

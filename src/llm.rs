//! Groq chat-completion client
//!
//! One outbound request per call, no retry, no caching. A non-success HTTP
//! status surfaces as `SqlFixError::Api` carrying the status and body.

use crate::config::{Config, CORRECTION_TEMPERATURE};
use crate::error::{Result, SqlFixError};
use crate::prompts;
use async_trait::async_trait;
use serde::Deserialize;

/// Something that can turn a broken SQL string into a corrected one.
///
/// The production implementation goes over the network; tests plug in a
/// fixture so validation logic runs offline.
#[async_trait]
pub trait CorrectionProvider {
    async fn correct_sql(&self, incorrect_sql: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
}

pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        }
    }

    /// Fetch the identifiers of the models the endpoint offers.
    ///
    /// Informational only; the driver prints these at startup.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SqlFixError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let models: ModelList = response.json().await?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": CORRECTION_TEMPERATURE
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SqlFixError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl CorrectionProvider for LlmClient {
    /// Ask the model for a corrected version of one SQL statement.
    async fn correct_sql(&self, incorrect_sql: &str) -> Result<String> {
        self.chat(
            prompts::CORRECTION_SYSTEM_PROMPT,
            &prompts::correction_prompt(incorrect_sql),
        )
        .await
    }
}

//! OpenAI provider (embeddings and chat completions REST API)

use async_trait::async_trait;
use std::time::Duration;

use crate::config::{key_is_placeholder, OpenAiConfig};
use crate::error::{Error, Result};

use super::embedding::{EmbeddingProvider, EmbeddingTask};
use super::llm::{LlmProvider, LlmTask};

const API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI embedding and generation provider
#[derive(Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    temperature: f32,
}

impl OpenAiProvider {
    /// Create a provider, validating credentials before any network call
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        if key_is_placeholder(&config.api_key) {
            return Err(Error::Config(
                "OpenAI API key is not configured (empty or placeholder)".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            embedding_model: config.embedding_model.clone(),
            generation_model: config.generation_model.clone(),
            temperature: config.temperature,
        })
    }
}

#[derive(serde::Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: String,
}

#[derive(serde::Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(serde::Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
        // OpenAI embedding models are symmetric; the task hint is not sent.
        let request = EmbeddingsRequest {
            model: self.embedding_model.clone(),
            input: text.to_string(),
        };

        let response = self
            .client
            .post(format!("{API_BASE}/embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("OpenAI embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "OpenAI embedding failed ({status}): {body}"
            )));
        }

        let embeddings: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("failed to parse OpenAI embedding response: {e}")))?;

        embeddings
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("no embedding in OpenAI response".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str, task: LlmTask) -> Result<String> {
        tracing::debug!(task = task.label(), model = %self.generation_model, "calling OpenAI");

        let request = ChatRequest {
            model: self.generation_model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: task.system_instruction().to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{API_BASE}/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!(
                "OpenAI generation failed ({status}): {body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("failed to parse OpenAI response: {e}")))?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(Error::Llm("OpenAI returned an empty response".to_string()));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.generation_model
    }
}

//! Google AI provider (generativelanguage REST API)
//!
//! Implements both gateways against the Gemini API family: `embedContent`
//! for embeddings (with asymmetric task types for documents vs queries) and
//! `generateContent` for text generation.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::{key_is_placeholder, GoogleConfig};
use crate::error::{Error, Result};

use super::embedding::{EmbeddingProvider, EmbeddingTask};
use super::llm::{LlmProvider, LlmTask};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google AI embedding and generation provider
#[derive(Debug)]
pub struct GoogleAiProvider {
    client: reqwest::Client,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GoogleAiProvider {
    /// Create a provider, validating credentials before any network call
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        if key_is_placeholder(&config.api_key) {
            return Err(Error::Config(
                "Google API key is not configured (empty or placeholder)".to_string(),
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
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn embed_endpoint(&self) -> String {
        format!(
            "{API_BASE}/models/{}:embedContent?key={}",
            self.embedding_model, self.api_key
        )
    }

    fn generate_endpoint(&self) -> String {
        format!(
            "{API_BASE}/models/{}:generateContent?key={}",
            self.generation_model, self.api_key
        )
    }
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
    #[serde(rename = "taskType")]
    task_type: &'static str,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl EmbeddingProvider for GoogleAiProvider {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        let task_type = match task {
            EmbeddingTask::Document => "RETRIEVAL_DOCUMENT",
            EmbeddingTask::Query => "RETRIEVAL_QUERY",
        };

        let request = EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            task_type,
        };

        let response = self
            .client
            .post(self.embed_endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Google embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Google embedding failed ({status}): {body}"
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("failed to parse Google embedding response: {e}")))?;

        Ok(embed_response.embedding.values)
    }

    fn name(&self) -> &str {
        "google"
    }
}

#[async_trait]
impl LlmProvider for GoogleAiProvider {
    async fn generate(&self, prompt: &str, task: LlmTask) -> Result<String> {
        tracing::debug!(task = task.label(), model = %self.generation_model, "calling Gemini");

        let request = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: task.system_instruction().to_string(),
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.generate_endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("Gemini generation failed ({status}): {body}")));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("failed to parse Gemini response: {e}")))?;

        let text = gen_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(Error::Llm("Gemini returned an empty response".to_string()));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.generation_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_key_fails_construction() {
        let config = GoogleConfig {
            api_key: "YOUR_GOOGLE_API_KEY".to_string(),
            ..GoogleConfig::default()
        };
        let err = GoogleAiProvider::new(&config).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn real_looking_key_constructs() {
        let config = GoogleConfig {
            api_key: "AIzaSyTest123".to_string(),
            ..GoogleConfig::default()
        };
        assert!(GoogleAiProvider::new(&config).is_ok());
    }
}

/// OpenAI embeddings API client.
///
/// Blocking HTTP provider for the `/v1/embeddings` endpoint. The API key is
/// an explicit constructor argument; this module never reads the
/// environment itself.
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, EmbedderError};
use crate::config::ModelConfig;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Build a client for the given credential and model settings.
    pub fn new(api_key: String, model: &ModelConfig) -> Result<Self, EmbedderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("cpprag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EmbedderError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: model.name.clone(),
            dimensions: model.dimensions,
        })
    }

    fn request(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        debug!("Embedding {} inputs with {}", inputs.len(), self.model);

        let body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };

        let resp = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| EmbedderError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(EmbedderError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))?;

        if parsed.data.len() != inputs.len() {
            return Err(EmbedderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                parsed.data.len()
            )));
        }

        let mut rows = parsed.data;
        rows.sort_by_key(|row| row.index);
        Ok(rows.into_iter().map(|row| row.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut vectors = self.request(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| EmbedderError::InvalidResponse("empty response data".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

//! OpenAI API embedding and transcription providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use gradewise_core::traits::{Embedder, Transcriber};

use crate::error::{check_status, http_client, parse_error, request_error, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection details shared by the OpenAI providers.
struct OpenAiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    fn new(api_key: &str, base_url: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/v1/{endpoint}", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        model: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| request_error(e, "OpenAI", &self.base_url, DEFAULT_TIMEOUT_SECS))?;

        if response.status().as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        check_status(response, model).await
    }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

/// OpenAI-compatible `/v1/embeddings` provider.
pub struct OpenAiEmbedder {
    inner: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        model: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            inner: OpenAiClient::new(api_key, base_url)?,
            model: model.to_string(),
        })
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input,
        };
        let response = self
            .inner
            .send(self.inner.post("embeddings").json(&body), &self.model)
            .await?;

        let mut parsed: EmbeddingResponse = response.json().await.map_err(parse_error)?;
        if parsed.data.len() != input.len() {
            return Err(parse_error(format!(
                "expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| parse_error("empty embeddings list").into())
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(self.request(texts).await?)
    }
}

// ---------------------------------------------------------------------------
// Transcription
// ---------------------------------------------------------------------------

/// Whisper transcription via `/v1/audio/transcriptions`.
pub struct OpenAiTranscriber {
    inner: OpenAiClient,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        model: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            inner: OpenAiClient::new(api_key, base_url)?,
            model: model.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, audio), fields(model = %self.model, bytes = audio.len()))]
    async fn transcribe(&self, audio: &[u8]) -> anyhow::Result<String> {
        let file = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("answer.wav")
            .mime_str("audio/wav")
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.model.clone());

        let response = self
            .inner
            .send(self.inner.post("audio/transcriptions").multipart(form), &self.model)
            .await?;
        let parsed: TranscriptionResponse = response.json().await.map_err(parse_error)?;

        if parsed.text.trim().is_empty() {
            return Err(ProviderError::Unrecognized.into());
        }
        Ok(parsed.text)
    }
}

//! Hugging Face Inference API providers.
//!
//! One hosted model per capability: sentence embeddings, extractive question
//! answering, and speech recognition. All three share the same
//! `POST {base}/models/{model}` endpoint shape with bearer-token auth.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use gradewise_core::similarity::mean_pool;
use gradewise_core::traits::{Answer, Answerer, Embedder, Transcriber};

use crate::error::{check_status, http_client, parse_error, request_error, ProviderError};

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

struct HfClient {
    api_token: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl HfClient {
    fn new(api_token: &str, base_url: Option<String>, model: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            api_token: api_token.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            client: http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    fn post(&self) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/models/{}", self.base_url, self.model))
            .header("Authorization", format!("Bearer {}", self.api_token))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = request.send().await.map_err(|e| {
            request_error(e, "Hugging Face", &self.base_url, DEFAULT_TIMEOUT_SECS)
        })?;
        check_status(response, &self.model).await
    }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

/// Sentence embeddings via the feature-extraction pipeline.
pub struct HuggingFaceEmbedder {
    inner: HfClient,
}

impl HuggingFaceEmbedder {
    pub fn new(
        api_token: &str,
        base_url: Option<String>,
        model: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            inner: HfClient::new(api_token, base_url, model)?,
        })
    }
}

#[derive(Serialize)]
struct FeatureRequest<'a> {
    inputs: &'a str,
}

/// Feature-extraction output. Sentence-transformer models return one pooled
/// vector; plain encoders return one vector per token.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Pooled(Vec<f32>),
    Tokens(Vec<Vec<f32>>),
    Batched(Vec<Vec<Vec<f32>>>),
}

impl FeatureResponse {
    fn into_vector(self) -> Vec<f32> {
        match self {
            FeatureResponse::Pooled(v) => v,
            FeatureResponse::Tokens(rows) => mean_pool(&rows),
            FeatureResponse::Batched(mut batch) => {
                if batch.is_empty() {
                    Vec::new()
                } else {
                    mean_pool(&batch.swap_remove(0))
                }
            }
        }
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    fn name(&self) -> &str {
        "huggingface"
    }

    #[instrument(skip(self, text), fields(model = %self.inner.model))]
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let request = self.inner.post().json(&FeatureRequest { inputs: text });
        let response = self.inner.send(request).await?;
        let parsed: FeatureResponse = response.json().await.map_err(parse_error)?;

        let vector = parsed.into_vector();
        if vector.is_empty() {
            return Err(parse_error("empty feature vector").into());
        }
        Ok(vector)
    }
}

// ---------------------------------------------------------------------------
// Question answering
// ---------------------------------------------------------------------------

/// Extractive question answering.
pub struct HuggingFaceAnswerer {
    inner: HfClient,
}

impl HuggingFaceAnswerer {
    pub fn new(
        api_token: &str,
        base_url: Option<String>,
        model: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            inner: HfClient::new(api_token, base_url, model)?,
        })
    }
}

#[derive(Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
}

#[derive(Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct QaResponse {
    answer: String,
    #[serde(default)]
    score: Option<f64>,
}

#[async_trait]
impl Answerer for HuggingFaceAnswerer {
    fn name(&self) -> &str {
        "huggingface"
    }

    #[instrument(skip(self, question, context), fields(model = %self.inner.model))]
    async fn answer(&self, question: &str, context: &str) -> anyhow::Result<Answer> {
        let body = QaRequest {
            inputs: QaInputs { question, context },
        };
        let response = self.inner.send(self.inner.post().json(&body)).await?;
        let parsed: QaResponse = response.json().await.map_err(parse_error)?;
        debug!(score = ?parsed.score, "answer extracted");

        Ok(Answer {
            text: parsed.answer,
            score: parsed.score,
        })
    }
}

// ---------------------------------------------------------------------------
// Speech recognition
// ---------------------------------------------------------------------------

/// Automatic speech recognition from raw audio bytes.
pub struct HuggingFaceTranscriber {
    inner: HfClient,
}

impl HuggingFaceTranscriber {
    pub fn new(
        api_token: &str,
        base_url: Option<String>,
        model: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            inner: HfClient::new(api_token, base_url, model)?,
        })
    }
}

#[derive(Deserialize)]
struct AsrResponse {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Transcriber for HuggingFaceTranscriber {
    fn name(&self) -> &str {
        "huggingface"
    }

    #[instrument(skip(self, audio), fields(model = %self.inner.model, bytes = audio.len()))]
    async fn transcribe(&self, audio: &[u8]) -> anyhow::Result<String> {
        let request = self
            .inner
            .post()
            .header("content-type", "audio/wav")
            .body(audio.to_vec());
        let response = self.inner.send(request).await?;
        let parsed: AsrResponse = response.json().await.map_err(parse_error)?;

        if parsed.text.trim().is_empty() {
            return Err(ProviderError::Unrecognized.into());
        }
        Ok(parsed.text)
    }
}

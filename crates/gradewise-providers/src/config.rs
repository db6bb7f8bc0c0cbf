//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gradewise_core::normalize::Normalizer;
use gradewise_core::suggest::SuggestOptions;
use gradewise_core::traits::{Answerer, Embedder, Transcriber};
use gradewise_core::Threshold;

use crate::error::{ConfigError, ProviderError};
use crate::hashing::{HashingEmbedder, DEFAULT_DIMENSIONS};
use crate::huggingface::{HuggingFaceAnswerer, HuggingFaceEmbedder, HuggingFaceTranscriber};
use crate::ollama::OllamaEmbedder;
use crate::openai::{OpenAiEmbedder, OpenAiTranscriber};

/// Name of the built-in offline embedder.
pub const LOCAL_PROVIDER: &str = "local";

/// Configuration for a single provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_openai_embedding_model")]
        embedding_model: String,
        #[serde(default = "default_openai_transcription_model")]
        transcription_model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_embedding_model")]
        embedding_model: String,
    },
    HuggingFace {
        api_token: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_hf_embedding_model")]
        embedding_model: String,
        #[serde(default = "default_hf_qa_model")]
        qa_model: String,
        #[serde(default = "default_hf_asr_model")]
        asr_model: String,
    },
    Hashing {
        #[serde(default = "default_dimensions")]
        dimensions: usize,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                embedding_model,
                transcription_model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("embedding_model", embedding_model)
                .field("transcription_model", transcription_model)
                .finish(),
            ProviderConfig::Ollama {
                base_url,
                embedding_model,
            } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .field("embedding_model", embedding_model)
                .finish(),
            ProviderConfig::HuggingFace {
                api_token: _,
                base_url,
                embedding_model,
                qa_model,
                asr_model,
            } => f
                .debug_struct("HuggingFace")
                .field("api_token", &"***")
                .field("base_url", base_url)
                .field("embedding_model", embedding_model)
                .field("qa_model", qa_model)
                .field("asr_model", asr_model)
                .finish(),
            ProviderConfig::Hashing { dimensions } => f
                .debug_struct("Hashing")
                .field("dimensions", dimensions)
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Provider type as written in the `type` key.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAI { .. } => "openai",
            ProviderConfig::Ollama { .. } => "ollama",
            ProviderConfig::HuggingFace { .. } => "huggingface",
            ProviderConfig::Hashing { .. } => "hashing",
        }
    }
}

fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_openai_transcription_model() -> String {
    "whisper-1".to_string()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_ollama_embedding_model() -> String {
    "nomic-embed-text".to_string()
}
fn default_hf_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}
fn default_hf_qa_model() -> String {
    "google-bert/bert-large-uncased-whole-word-masking-finetuned-squad".to_string()
}
fn default_hf_asr_model() -> String {
    "openai/whisper-large-v3".to_string()
}
fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

/// Top-level gradewise configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradewiseConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider that embeds answers for grading.
    #[serde(default = "default_embedder")]
    pub embedder: String,
    /// Provider that transcribes spoken answers.
    #[serde(default)]
    pub transcriber: Option<String>,
    /// Provider that answers free-form questions.
    #[serde(default)]
    pub answerer: Option<String>,
    /// Similarity a candidate must exceed to be graded correct.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Words dropped during normalization on top of the English list.
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
    #[serde(default = "default_stemming")]
    pub stemming: bool,
    #[serde(default)]
    pub suggest: SuggestOptions,
}

fn default_embedder() -> String {
    LOCAL_PROVIDER.to_string()
}
fn default_stemming() -> bool {
    true
}

impl Default for GradewiseConfig {
    fn default() -> Self {
        let mut config = Self {
            providers: HashMap::new(),
            embedder: default_embedder(),
            transcriber: None,
            answerer: None,
            threshold: None,
            extra_stop_words: Vec::new(),
            stemming: default_stemming(),
            suggest: SuggestOptions::default(),
        };
        config.ensure_local_provider();
        config
    }
}

impl GradewiseConfig {
    /// Parse a TOML document. Env var references are resolved and the
    /// built-in `local` provider is added when not overridden.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: GradewiseConfig = toml::from_str(content)?;
        config.providers = config
            .providers
            .iter()
            .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
            .collect();
        config.ensure_local_provider();
        Ok(config)
    }

    fn ensure_local_provider(&mut self) {
        self.providers
            .entry(LOCAL_PROVIDER.into())
            .or_insert(ProviderConfig::Hashing {
                dimensions: DEFAULT_DIMENSIONS,
            });
    }

    /// Look up a provider by name.
    pub fn provider(&self, name: &str) -> Result<&ProviderConfig, ConfigError> {
        self.providers.get(name).ok_or_else(|| {
            let mut available: Vec<String> = self.providers.keys().cloned().collect();
            available.sort();
            ConfigError::UnknownProvider {
                name: name.to_string(),
                available,
            }
        })
    }

    /// The grading threshold, preferring `override_value` over the file.
    pub fn threshold(&self, override_value: Option<f64>) -> Result<Threshold> {
        let value = override_value
            .or(self.threshold)
            .ok_or(ConfigError::MissingThreshold)?;
        Ok(Threshold::new(value)?)
    }

    /// Build the text normalizer described by this config.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::english()
            .with_extra_stop_words(&self.extra_stop_words)
            .with_stemming(self.stemming)
    }

    /// Create the configured embedder, or the named one.
    pub fn embedder(&self, name: Option<&str>) -> Result<Arc<dyn Embedder>> {
        let name = name.unwrap_or(self.embedder.as_str());
        create_embedder(name, self.provider(name)?)
    }

    /// Create the configured transcriber, or the named one.
    pub fn transcriber(&self, name: Option<&str>) -> Result<Arc<dyn Transcriber>> {
        let name = name
            .or(self.transcriber.as_deref())
            .ok_or(ConfigError::Unassigned {
                capability: "transcription",
                key: "transcriber",
            })?;
        create_transcriber(name, self.provider(name)?)
    }

    /// Create the configured answerer, or the named one.
    pub fn answerer(&self, name: Option<&str>) -> Result<Arc<dyn Answerer>> {
        let name = name
            .or(self.answerer.as_deref())
            .ok_or(ConfigError::Unassigned {
                capability: "question answering",
                key: "answerer",
            })?;
        create_answerer(name, self.provider(name)?)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let resolve_opt = |o: &Option<String>| o.as_ref().map(|u| resolve_env_vars(u));
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            embedding_model,
            transcription_model,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            embedding_model: embedding_model.clone(),
            transcription_model: transcription_model.clone(),
        },
        ProviderConfig::Ollama {
            base_url,
            embedding_model,
        } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
            embedding_model: embedding_model.clone(),
        },
        ProviderConfig::HuggingFace {
            api_token,
            base_url,
            embedding_model,
            qa_model,
            asr_model,
        } => ProviderConfig::HuggingFace {
            api_token: resolve_env_vars(api_token),
            base_url: resolve_opt(base_url),
            embedding_model: embedding_model.clone(),
            qa_model: qa_model.clone(),
            asr_model: asr_model.clone(),
        },
        ProviderConfig::Hashing { dimensions } => ProviderConfig::Hashing {
            dimensions: *dimensions,
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradewise.toml` in the current directory
/// 2. `~/.config/gradewise/config.toml`
///
/// Environment variable overrides: `GRADEWISE_OPENAI_KEY`, `GRADEWISE_HF_TOKEN`.
pub fn load_config() -> Result<GradewiseConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradewiseConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradewise.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            GradewiseConfig::from_toml(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradewiseConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut GradewiseConfig) {
    if let Ok(key) = std::env::var("GRADEWISE_OPENAI_KEY") {
        config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                embedding_model: default_openai_embedding_model(),
                transcription_model: default_openai_transcription_model(),
            });
        if let Some(ProviderConfig::OpenAI { api_key, .. }) = config.providers.get_mut("openai") {
            *api_key = key;
        }
    }

    if let Ok(token) = std::env::var("GRADEWISE_HF_TOKEN") {
        config
            .providers
            .entry("huggingface".into())
            .or_insert(ProviderConfig::HuggingFace {
                api_token: String::new(),
                base_url: None,
                embedding_model: default_hf_embedding_model(),
                qa_model: default_hf_qa_model(),
                asr_model: default_hf_asr_model(),
            });
        if let Some(ProviderConfig::HuggingFace { api_token, .. }) =
            config.providers.get_mut("huggingface")
        {
            *api_token = token;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradewise"))
}

fn unsupported(name: &str, capability: &'static str) -> anyhow::Error {
    ProviderError::Unsupported {
        provider: name.to_string(),
        capability,
    }
    .into()
}

/// Create an embedder from its configuration.
pub fn create_embedder(name: &str, config: &ProviderConfig) -> Result<Arc<dyn Embedder>> {
    tracing::debug!(provider = name, kind = config.kind(), "creating embedder");
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            embedding_model,
            ..
        } => Ok(Arc::new(OpenAiEmbedder::new(
            api_key,
            base_url.clone(),
            embedding_model,
        )?)),
        ProviderConfig::Ollama {
            base_url,
            embedding_model,
        } => Ok(Arc::new(OllamaEmbedder::new(base_url, embedding_model)?)),
        ProviderConfig::HuggingFace {
            api_token,
            base_url,
            embedding_model,
            ..
        } => Ok(Arc::new(HuggingFaceEmbedder::new(
            api_token,
            base_url.clone(),
            embedding_model,
        )?)),
        ProviderConfig::Hashing { dimensions } => Ok(Arc::new(HashingEmbedder::new(*dimensions))),
    }
}

/// Create a transcriber from its configuration.
pub fn create_transcriber(name: &str, config: &ProviderConfig) -> Result<Arc<dyn Transcriber>> {
    tracing::debug!(provider = name, kind = config.kind(), "creating transcriber");
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            transcription_model,
            ..
        } => Ok(Arc::new(OpenAiTranscriber::new(
            api_key,
            base_url.clone(),
            transcription_model,
        )?)),
        ProviderConfig::HuggingFace {
            api_token,
            base_url,
            asr_model,
            ..
        } => Ok(Arc::new(HuggingFaceTranscriber::new(
            api_token,
            base_url.clone(),
            asr_model,
        )?)),
        ProviderConfig::Ollama { .. } | ProviderConfig::Hashing { .. } => {
            Err(unsupported(name, "transcription"))
        }
    }
}

/// Create a question answerer from its configuration.
pub fn create_answerer(name: &str, config: &ProviderConfig) -> Result<Arc<dyn Answerer>> {
    tracing::debug!(provider = name, kind = config.kind(), "creating answerer");
    match config {
        ProviderConfig::HuggingFace {
            api_token,
            base_url,
            qa_model,
            ..
        } => Ok(Arc::new(HuggingFaceAnswerer::new(
            api_token,
            base_url.clone(),
            qa_model,
        )?)),
        _ => Err(unsupported(name, "question answering")),
    }
}

//! gradewise-providers: Capability backends.
//!
//! Implements the `Embedder`, `Transcriber`, and `Answerer` traits for
//! OpenAI, Ollama, and the Hugging Face Inference API, plus an offline
//! hashing embedder and mocks for tests.

pub mod config;
pub mod error;
pub mod hashing;
pub mod huggingface;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{
    create_answerer, create_embedder, create_transcriber, load_config, GradewiseConfig,
    ProviderConfig,
};
pub use error::ProviderError;

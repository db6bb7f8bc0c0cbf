//! The `gradewise init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("gradewise.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("questions.csv"), SAMPLE_QUESTIONS)?;

    println!("\nNext steps:");
    println!("  1. Edit gradewise.toml to pick an embedder and a threshold");
    println!("  2. Run: gradewise validate --questions questions.csv");
    println!("  3. Run: gradewise quiz --questions questions.csv --count 3");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradewise configuration

# Provider used to embed answers. "local" is a built-in offline embedder that
# only measures word overlap; switch to a model-backed provider for meaning.
embedder = "local"

# An answer is correct when its similarity to the reference exceeds this.
threshold = 0.8

# transcriber = "openai"
# answerer = "huggingface"

extra_stop_words = []
stemming = true

[suggest]
initial_threshold = 0.2
step = 0.05
min_results = 5

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
embedding_model = "nomic-embed-text"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
embedding_model = "text-embedding-3-small"
transcription_model = "whisper-1"

[providers.huggingface]
type = "huggingface"
api_token = "${HF_TOKEN}"
embedding_model = "sentence-transformers/all-MiniLM-L6-v2"
"#;

const SAMPLE_QUESTIONS: &str = r#"question,answer
What is 2+2?,4
Which keyword defines a function in Python?,def
Which keyword starts an exception handler in Python?,try except
What does a class create?,instances of the class
Which brackets create a list in Python?,square brackets
"#;

//! gradewise CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gradewise", version, about = "Similarity-graded quizzes and answer checking")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one answer against a reference answer
    Grade {
        /// The answer to grade
        #[arg(long)]
        candidate: String,

        /// The expected answer
        #[arg(long)]
        reference: String,

        /// Similarity the answer must exceed, strictly between 0 and 1
        #[arg(long)]
        threshold: Option<f64>,

        /// Embedding provider name from the config
        #[arg(long)]
        embedder: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an interactive quiz over a CSV question bank
    Quiz {
        /// CSV file with `question,answer` rows
        #[arg(long)]
        questions: PathBuf,

        /// Number of questions to ask (default: all, in file order)
        #[arg(long)]
        count: Option<usize>,

        /// Similarity an answer must exceed, strictly between 0 and 1
        #[arg(long)]
        threshold: Option<f64>,

        /// Seed for question selection
        #[arg(long)]
        seed: Option<u64>,

        /// Embedding provider name from the config
        #[arg(long)]
        embedder: Option<String>,

        /// Directory to write a JSON report into
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a CSV question bank for problems
    Validate {
        /// CSV file with `question,answer` rows
        #[arg(long)]
        questions: PathBuf,
    },

    /// Rank corpus entries by similarity to a description
    Suggest {
        /// Headered CSV corpus
        #[arg(long)]
        corpus: PathBuf,

        /// Free-text description to match
        #[arg(long)]
        query: String,

        /// Column to match against (default: all columns joined)
        #[arg(long)]
        text_column: Option<String>,

        /// Column to display for each match (default: the text column)
        #[arg(long)]
        show: Option<String>,

        /// Minimum number of matches before the threshold stops decaying
        #[arg(long)]
        min_results: Option<usize>,

        /// Embedding provider name from the config
        #[arg(long)]
        embedder: Option<String>,
    },

    /// Answer a question from a context passage
    Ask {
        /// The question
        #[arg(long)]
        question: String,

        /// Context passage
        #[arg(long, conflicts_with = "context_file")]
        context: Option<String>,

        /// Read the context passage from a file
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// Question-answering provider name from the config
        #[arg(long)]
        answerer: Option<String>,
    },

    /// Transcribe a recorded answer and optionally grade it
    Transcribe {
        /// Audio file (WAV, FLAC, ...)
        #[arg(long)]
        audio: PathBuf,

        /// Expected answer to grade the transcript against
        #[arg(long)]
        reference: Option<String>,

        /// Similarity the transcript must exceed when grading
        #[arg(long)]
        threshold: Option<f64>,

        /// Transcription provider name from the config
        #[arg(long)]
        transcriber: Option<String>,

        /// Embedding provider name from the config, used when grading
        #[arg(long)]
        embedder: Option<String>,
    },

    /// Create a starter config and question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gradewise=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Grade {
            candidate,
            reference,
            threshold,
            embedder,
            json,
        } => {
            commands::grade::execute(candidate, reference, threshold, embedder, json, config).await
        }
        Commands::Quiz {
            questions,
            count,
            threshold,
            seed,
            embedder,
            output,
        } => {
            commands::quiz::execute(questions, count, threshold, seed, embedder, output, config)
                .await
        }
        Commands::Validate { questions } => commands::validate::execute(questions, config),
        Commands::Suggest {
            corpus,
            query,
            text_column,
            show,
            min_results,
            embedder,
        } => {
            commands::suggest::execute(
                corpus,
                query,
                text_column,
                show,
                min_results,
                embedder,
                config,
            )
            .await
        }
        Commands::Ask {
            question,
            context,
            context_file,
            answerer,
        } => commands::ask::execute(question, context, context_file, answerer, config).await,
        Commands::Transcribe {
            audio,
            reference,
            threshold,
            transcriber,
            embedder,
        } => {
            commands::transcribe::execute(
                audio,
                reference,
                threshold,
                transcriber,
                embedder,
                config,
            )
            .await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

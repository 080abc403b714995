//! examkit command-line tool
//!
//! One-shot pipeline runs against a study document: ingest it into an
//! in-memory index and ask a question over it, summarize it, or generate
//! exam questions from it.
//!
//! Run with: cargo run -p examkit --features cli -- ask notes.pdf "What is osmosis?"

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use examkit::config::AppConfig;
use examkit::generation::{self, QuestionGenerator};
use examkit::grading::AnswerGrader;
use examkit::ingestion::{Chunker, IngestPipeline, TextExtractor};
use examkit::providers::{build_embedding_provider, build_llm_provider};
use examkit::rag::RagEngine;
use examkit::retrieval::build_vector_index;
use examkit::storage::MemoryChunkStore;
use examkit::types::{QuestionType, SourceFormat, StudyDocument};

#[derive(Parser)]
#[command(name = "examkit", about = "Study-material AI pipeline", version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a document and answer a question over it
    Ask {
        /// Study document (pdf, docx, or plain text)
        file: PathBuf,
        /// Question to answer
        question: String,
    },
    /// Summarize a document
    Summarize {
        /// Study document (pdf, docx, or plain text)
        file: PathBuf,
    },
    /// Generate exam questions from a document
    Questions {
        /// Study document (pdf, docx, or plain text)
        file: PathBuf,
        /// Number of questions to generate
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },
    /// Grade a free-text answer against a question
    Grade {
        /// Question text
        question: String,
        /// The student's answer
        answer: String,
        /// Maximum points
        #[arg(long, default_value_t = 10.0)]
        max_points: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "examkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env(),
    };

    match cli.command {
        Command::Ask { file, question } => {
            let embedder = build_embedding_provider(&config)?;
            let llm = build_llm_provider(&config)?;
            let index = build_vector_index(&config);
            let chunks = Arc::new(MemoryChunkStore::new());

            let pipeline = IngestPipeline::new(
                Chunker::from_config(&config.chunking),
                embedder.clone(),
                index.clone(),
                chunks.clone(),
            );
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let document = StudyDocument::new(
                filename.clone(),
                filename,
                SourceFormat::from_path(&file),
            );
            let ingested = pipeline
                .ingest_file(document.id, &file, document.format)
                .await?;
            tracing::info!(document_id = %document.id, chunks = ingested.len(), "document ingested");

            let engine = RagEngine::new(embedder, index, chunks, llm, config.retrieval.top_k);
            let result = engine.answer(&question).await?;

            println!("{}", result.answer);
            if !result.context_ids.is_empty() {
                println!("\n[grounded in {} chunk(s)]", result.context_ids.len());
            }
        }
        Command::Summarize { file } => {
            let llm = build_llm_provider(&config)?;
            let text = TextExtractor::extract_auto(&file);
            let summary = generation::summarize(llm.as_ref(), &text).await?;
            println!("{summary}");
        }
        Command::Questions { file, count } => {
            let llm = build_llm_provider(&config)?;
            let text = TextExtractor::extract_auto(&file);
            let generator = QuestionGenerator::new(llm);
            let questions = generator
                .generate(
                    &text,
                    count,
                    &[QuestionType::MultipleChoice, QuestionType::ShortAnswer],
                )
                .await?;

            for (i, question) in questions.iter().enumerate() {
                println!("{}. [{}] {}", i + 1, question.question_type.as_str(), question.text);
                if let Some(options) = &question.options {
                    println!("   {}", options.render_list());
                    println!("   correct: {}", options.correct);
                }
            }
        }
        Command::Grade {
            question,
            answer,
            max_points,
        } => {
            let llm = build_llm_provider(&config)?;
            let grader = AnswerGrader::new(llm);
            let result = grader
                .grade(&examkit::grading::GradeRequest {
                    question_text: &question,
                    question_type: QuestionType::ShortAnswer,
                    answer_text: &answer,
                    max_points,
                    options: None,
                    context_text: None,
                })
                .await;

            println!("{}", result.feedback);
            match result.points_awarded {
                Some(points) => println!("\nAwarded: {points} / {max_points}"),
                None => println!("\nAwarded: undetermined"),
            }
        }
    }

    Ok(())
}

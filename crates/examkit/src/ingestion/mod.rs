//! Document ingestion: text extraction, chunking, embedding, index upsert

mod chunker;
mod extractor;
mod pipeline;

pub use chunker::Chunker;
pub use extractor::TextExtractor;
pub use pipeline::IngestPipeline;

//! Study documents and the text chunks extracted from them

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Source document formats the extractor understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Text,
    /// Anything else; decoded as raw bytes with invalid-byte tolerance
    Unknown,
}

impl SourceFormat {
    /// Detect format from a file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" | "text" | "md" | "markdown" => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// Detect format from a file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

/// An uploaded study document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyDocument {
    /// Unique document ID
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Original filename
    pub filename: String,
    /// Detected source format
    pub format: SourceFormat,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl StudyDocument {
    /// Create a new document record
    pub fn new(title: String, filename: String, format: SourceFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            filename,
            format,
            uploaded_at: chrono::Utc::now(),
        }
    }
}

/// A bounded slice of a document's text, the unit of embedding and retrieval.
///
/// Chunks are created in bulk during ingestion and are immutable afterwards
/// except for the review-flag counter. A document's chunks ordered by
/// `sequence_number` reconstruct the extracted text up to whitespace and
/// the configured overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Owning document
    pub document_id: Uuid,
    /// Position of the chunk within its document (unique per document)
    pub sequence_number: u32,
    /// Text content
    pub text: String,
    /// Identity of this chunk in the external vector index (globally unique)
    pub vector_id: String,
    /// Embedding provider that produced the stored vector
    pub embedding_provider: String,
    /// Times this chunk was associated with negative feedback or low AI
    /// confidence
    pub review_flags: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        document_id: Uuid,
        sequence_number: u32,
        text: String,
        vector_id: String,
        embedding_provider: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            sequence_number,
            text,
            vector_id,
            embedding_provider,
            review_flags: 0,
        }
    }
}

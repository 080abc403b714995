//! Vector index clients for similarity search

mod http;
mod index;
mod memory;

use std::sync::Arc;

use crate::config::{AppConfig, IndexBackend};

pub use http::HttpVectorIndex;
pub use index::{usable_points, Neighbor, VectorIndex, VectorPoint};
pub use memory::MemoryVectorIndex;

/// Build the vector index selected by configuration.
pub fn build_vector_index(config: &AppConfig) -> Arc<dyn VectorIndex> {
    match config.vector_index.backend {
        IndexBackend::Memory => Arc::new(MemoryVectorIndex::new()),
        IndexBackend::Http => Arc::new(HttpVectorIndex::new(&config.vector_index)),
    }
}

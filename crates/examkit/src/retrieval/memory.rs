//! In-process brute-force vector index
//!
//! Cosine-distance linear scan over a concurrent map. Suitable for tests
//! and single-process development; the production index is a remote
//! service.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;

use super::index::{usable_points, Neighbor, VectorIndex, VectorPoint};

/// Brute-force in-memory vector index
#[derive(Default)]
pub struct MemoryVectorIndex {
    points: DashMap<String, Vec<f32>>,
}

impl MemoryVectorIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Cosine similarity over the shared prefix of two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let dot: f32 = a[..len].iter().zip(&b[..len]).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a[..len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b[..len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, points: &[VectorPoint]) -> Result<()> {
        for point in usable_points(points)? {
            self.points.insert(point.id.clone(), point.vector.clone());
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Vec<Neighbor> {
        let mut neighbors: Vec<Neighbor> = self
            .points
            .iter()
            .map(|entry| Neighbor {
                id: entry.key().clone(),
                distance: 1.0 - cosine_similarity(vector, entry.value()),
            })
            .collect();

        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(top_k);
        neighbors
    }

    fn name(&self) -> &str {
        "memory"
    }
}

//! Vector index trait

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A chunk vector keyed by its opaque index id
#[derive(Debug, Clone)]
pub struct VectorPoint {
    /// Identity of the vector in the index
    pub id: String,
    /// Embedding; an empty vector marks a point that must not be submitted
    pub vector: Vec<f32>,
}

/// A nearest-neighbor match, nearest first in query results
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// Vector id of the matched point
    pub id: String,
    /// Distance from the query vector (smaller is nearer)
    pub distance: f32,
}

/// Trait for external similarity-search services.
///
/// The index is eventually consistent: an id that was upserted may not be
/// immediately queryable, and a queried id may no longer exist locally.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert points into the index.
    ///
    /// Points with an empty vector are filtered out before submission; if
    /// nothing remains, the call fails without submitting anything.
    async fn upsert(&self, points: &[VectorPoint]) -> Result<()>;

    /// Return the `top_k` nearest points to `vector`, nearest first.
    ///
    /// An unreachable or misconfigured index yields an empty list, not an
    /// error, so callers treat "no results" and "service down" identically.
    async fn query(&self, vector: &[f32], top_k: usize) -> Vec<Neighbor>;

    /// Index name for logging
    fn name(&self) -> &str;
}

/// Drop points with no usable vector; error when none remain.
pub fn usable_points(points: &[VectorPoint]) -> Result<Vec<&VectorPoint>> {
    let usable: Vec<&VectorPoint> = points
        .iter()
        .filter(|point| {
            if point.vector.is_empty() {
                tracing::warn!(id = %point.id, "skipping point with no vector in upsert");
                false
            } else {
                true
            }
        })
        .collect();

    if usable.is_empty() {
        return Err(Error::VectorIndex(
            "no valid points to upsert".to_string(),
        ));
    }
    Ok(usable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vectors_are_filtered() {
        let points = vec![
            VectorPoint {
                id: "a".to_string(),
                vector: vec![1.0],
            },
            VectorPoint {
                id: "b".to_string(),
                vector: Vec::new(),
            },
        ];
        let usable = usable_points(&points).unwrap();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].id, "a");
    }

    #[test]
    fn all_empty_is_an_error() {
        let points = vec![VectorPoint {
            id: "a".to_string(),
            vector: Vec::new(),
        }];
        assert!(usable_points(&points).is_err());
        assert!(usable_points(&[]).is_err());
    }
}

//! HTTP client for a remote similarity-search service

use async_trait::async_trait;
use std::time::Duration;

use crate::config::VectorIndexConfig;
use crate::error::{Error, Result};

use super::index::{usable_points, Neighbor, VectorIndex, VectorPoint};

/// Remote vector index over a JSON HTTP API
pub struct HttpVectorIndex {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVectorIndex {
    /// Create a client for the configured index service
    pub fn new(config: &VectorIndexConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(serde::Serialize)]
struct UpsertRequest {
    points: Vec<WirePoint>,
}

#[derive(serde::Serialize)]
struct WirePoint {
    id: String,
    vector: Vec<f32>,
}

#[derive(serde::Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
}

#[derive(serde::Deserialize)]
struct QueryResponse {
    #[serde(default)]
    neighbors: Vec<WireNeighbor>,
}

#[derive(serde::Deserialize)]
struct WireNeighbor {
    id: String,
    distance: f32,
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn upsert(&self, points: &[VectorPoint]) -> Result<()> {
        let usable = usable_points(points)?;

        let request = UpsertRequest {
            points: usable
                .iter()
                .map(|p| WirePoint {
                    id: p.id.clone(),
                    vector: p.vector.clone(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::VectorIndex(format!("index upsert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorIndex(format!(
                "index upsert failed ({status}): {body}"
            )));
        }

        tracing::info!(count = request.points.len(), "upserted points to vector index");
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Vec<Neighbor> {
        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
        };

        let response = match self
            .client
            .post(format!("{}/vectors/query", self.base_url))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("vector index query failed: {e}");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "vector index query rejected");
            return Vec::new();
        }

        match response.json::<QueryResponse>().await {
            Ok(parsed) => parsed
                .neighbors
                .into_iter()
                .map(|n| Neighbor {
                    id: n.id,
                    distance: n.distance,
                })
                .collect(),
            Err(e) => {
                tracing::error!("failed to parse vector index response: {e}");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_index_queries_as_empty() {
        let index = HttpVectorIndex::new(&VectorIndexConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            ..VectorIndexConfig::default()
        });

        let neighbors = index.query(&[0.1, 0.2], 3).await;
        assert!(neighbors.is_empty());
    }

    #[tokio::test]
    async fn unreachable_index_upsert_is_an_error() {
        let index = HttpVectorIndex::new(&VectorIndexConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            ..VectorIndexConfig::default()
        });

        let err = index
            .upsert(&[VectorPoint {
                id: "a".to_string(),
                vector: vec![1.0],
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VectorIndex(_)));
    }
}

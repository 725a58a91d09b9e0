//! Pinecone vector store provider
//!
//! Talks to the index data plane (`https://{host}`) for upsert, query, delete
//! and stats, and to the control plane (`https://api.pinecone.io`) to create
//! indexes.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::PineconeConfig;
use crate::error::{Error, Result};

use super::vector_store::{IndexRecord, MetadataFilter, StoreMatch, StoreStats, VectorStoreProvider};

const API_VERSION: &str = "2024-07";

/// Pinecone serverless index
pub struct PineconeStore {
    client: Client,
    /// Data-plane base URL, e.g. "https://rightsteps-docs-abc123.svc.us-east-1.pinecone.io"
    host: String,
    api_key: String,
    index_name: String,
}

/// Result of [`PineconeStore::create_index`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateIndexOutcome {
    /// Index was created
    Created,
    /// An index with that name already exists
    AlreadyExists,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<Vector<'a>>,
}

#[derive(Serialize)]
struct Vector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a crate::types::ChunkMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeStatsResponse {
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    total_vector_count: usize,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: serde_json::Value,
}

impl PineconeStore {
    /// Create a store for the configured index. Requires an API key and the
    /// index host.
    pub fn new(config: &PineconeConfig) -> Result<Self> {
        let api_key = require_api_key(config)?;
        let host = config
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Config("PINECONE_HOST is not set".to_string()))?;

        Ok(Self {
            client: build_client(config)?,
            host: normalize_host(host),
            api_key,
            index_name: config.index_name.clone(),
        })
    }

    /// Index name
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Create a serverless index through the control plane.
    ///
    /// An index that already exists counts as success.
    pub async fn create_index(config: &PineconeConfig, dimension: usize) -> Result<CreateIndexOutcome> {
        let api_key = require_api_key(config)?;
        let client = build_client(config)?;
        let url = format!("{}/indexes", config.control_plane_url.trim_end_matches('/'));

        let request = CreateIndexRequest {
            name: &config.index_name,
            dimension,
            metric: &config.metric,
            spec: json!({
                "serverless": {
                    "cloud": config.cloud,
                    "region": config.region,
                }
            }),
        };

        let response = client
            .post(&url)
            .header("Api-Key", &api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::VectorStore(format!("Pinecone create index request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => Ok(CreateIndexOutcome::Created),
            StatusCode::CONFLICT => Ok(CreateIndexOutcome::AlreadyExists),
            status => {
                let body = response.text().await.unwrap_or_default();
                if body.contains("ALREADY_EXISTS") || body.contains("already exists") {
                    return Ok(CreateIndexOutcome::AlreadyExists);
                }
                Err(Error::VectorStore(format!(
                    "Pinecone create index failed ({}): {}",
                    status, body
                )))
            }
        }
    }

    /// Look up an index's data-plane host through the control plane
    pub async fn describe_index_host(config: &PineconeConfig) -> Result<String> {
        #[derive(Deserialize)]
        struct IndexDescription {
            host: String,
        }

        let api_key = require_api_key(config)?;
        let client = build_client(config)?;
        let url = format!(
            "{}/indexes/{}",
            config.control_plane_url.trim_end_matches('/'),
            config.index_name
        );

        let response = client
            .get(&url)
            .header("Api-Key", &api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::VectorStore(format!("Pinecone describe index request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorStore(format!(
                "Pinecone describe index failed ({}): {}",
                status, body
            )));
        }

        let description: IndexDescription = response
            .json()
            .await
            .map_err(|e| Error::VectorStore(format!("Failed to parse Pinecone response: {}", e)))?;
        Ok(description.host)
    }

    /// POST to the data plane and decode the JSON reply
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de> + Send,
    {
        let url = format!("{}{}", self.host, path);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::VectorStore(format!("Pinecone request to {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorStore(format!(
                "Pinecone {} failed ({}): {}",
                path, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::VectorStore(format!("Failed to parse Pinecone response: {}", e)))
    }
}

fn require_api_key(config: &PineconeConfig) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::Config("PINECONE_API_KEY is not set".to_string()))
}

fn build_client(config: &PineconeConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// Accept bare hosts as printed by the Pinecone console
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorStoreProvider for PineconeStore {
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest {
            vectors: records
                .iter()
                .map(|r| Vector {
                    id: &r.id,
                    values: &r.values,
                    metadata: &r.metadata,
                })
                .collect(),
        };

        let _: serde_json::Value = self.post("/vectors/upsert", &request).await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<StoreMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            filter: filter.map(MetadataFilter::to_json),
        };

        let response: QueryResponse = self.post("/query", &request).await?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| StoreMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    async fn delete_many(&self, filter: &MetadataFilter) -> Result<()> {
        let request = json!({ "filter": filter.to_json() });
        let _: serde_json::Value = self.post("/vectors/delete", &request).await?;
        Ok(())
    }

    async fn describe(&self) -> Result<StoreStats> {
        let stats: DescribeStatsResponse = self.post("/describe_index_stats", &json!({})).await?;
        Ok(StoreStats {
            total_records: stats.total_vector_count,
            dimension: stats.dimension,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.describe().await.is_ok())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

//! 騰訊雲向量資料庫 adapter

use crate::config::VectorConfig;
use crate::utils::error::{AdapterError, Result};
use crate::utils::tc3;
use crate::utils::validation::validate_non_empty_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

const SERVICE: &str = "vector";
const WRITE_PATH: &str = "/vector/write";
const SEARCH_PATH: &str = "/search";

pub struct VectorClient {
    secret_id: String,
    secret_key: String,
    endpoint: String,
    host: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorData {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub collection_name: String,
    pub partition_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub collection_name: String,
    pub partition_name: Option<String>,
    pub top_k: usize,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Vec<SearchResult>,
}

impl VectorClient {
    pub fn new(config: &VectorConfig) -> Result<Self> {
        validate_non_empty_string("secret_id", &config.secret_id)?;
        validate_non_empty_string("secret_key", &config.secret_key)?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let host = Url::parse(&endpoint)?
            .host_str()
            .ok_or_else(|| AdapterError::ConfigError {
                message: format!("vector endpoint has no host: {}", endpoint),
            })?
            .to_string();

        Ok(Self {
            secret_id: config.secret_id.clone(),
            secret_key: config.secret_key.clone(),
            endpoint,
            host,
            client: reqwest::Client::new(),
        })
    }

    /// endpoint 主機名倒數第三段視為地域
    pub fn region(&self) -> &str {
        let labels: Vec<&str> = self.host.split('.').collect();
        if labels.len() < 3 {
            return "";
        }
        labels[labels.len() - 3]
    }

    /// TC3 簽名，payload 固定按空體雜湊（與原服務行為一致）
    fn authorization(&self, method: &str, path: &str, timestamp: i64) -> String {
        let date = tc3::utc_date(timestamp);

        let canonical_uri = if path.is_empty() { "/" } else { path };
        let canonical_headers = format!("host:{}\n", self.host);
        let canonical_request = format!(
            "{}\n{}\n\n{}\nhost\n{}",
            method, canonical_uri, canonical_headers, tc3::EMPTY_PAYLOAD_HASH
        );

        let credential_scope = format!("{}/{}/tc3_request", date, SERVICE);
        let string_to_sign = tc3::string_to_sign(timestamp, &credential_scope, &canonical_request);
        let signature = tc3::sign(&self.secret_key, &date, SERVICE, &string_to_sign);

        format!(
            "{} Credential={}/{}, SignedHeaders=host, Signature={}",
            tc3::TC3_ALGORITHM,
            self.secret_id,
            credential_scope,
            signature
        )
    }

    async fn send_request(&self, path: &str, body: &Value) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp();
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!("📡 vector: POST {}", path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.authorization("POST", path, timestamp))
            .header("Content-Type", "application/json")
            .header("Host", &self.host)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.as_u16() >= 400 {
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// 寫入向量
    pub async fn write_vectors(&self, vectors: &[VectorData], options: &WriteOptions) -> Result<()> {
        validate_non_empty_string("collection_name", &options.collection_name)?;

        let mut request = serde_json::Map::new();
        request.insert(
            "collection_name".to_string(),
            Value::from(options.collection_name.clone()),
        );
        if let Some(partition) = &options.partition_name {
            if !partition.is_empty() {
                request.insert("partition_name".to_string(), Value::from(partition.clone()));
            }
        }
        request.insert("vectors".to_string(), serde_json::to_value(vectors)?);

        self.send_request(WRITE_PATH, &Value::Object(request)).await?;
        tracing::info!(
            "🧭 vector: wrote {} vector(s) to {}",
            vectors.len(),
            options.collection_name
        );
        Ok(())
    }

    /// 相似度檢索，回傳按分數排序的結果
    pub async fn search(
        &self,
        query_vector: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        validate_non_empty_string("collection_name", &options.collection_name)?;

        let mut request = serde_json::Map::new();
        request.insert(
            "collection_name".to_string(),
            Value::from(options.collection_name.clone()),
        );
        request.insert("vector".to_string(), serde_json::to_value(query_vector)?);
        request.insert("top_k".to_string(), Value::from(options.top_k));
        if let Some(partition) = &options.partition_name {
            if !partition.is_empty() {
                request.insert("partition_name".to_string(), Value::from(partition.clone()));
            }
        }
        if let Some(filter) = &options.filter {
            if !filter.is_empty() {
                request.insert("filter".to_string(), Value::from(filter.clone()));
            }
        }

        let body = self.send_request(SEARCH_PATH, &Value::Object(request)).await?;
        let api_response: ApiResponse = serde_json::from_str(&body)?;
        if api_response.code != 0 {
            return Err(AdapterError::VectorDbError {
                code: api_response.code,
                message: api_response.message,
            });
        }
        Ok(api_response.data)
    }
}

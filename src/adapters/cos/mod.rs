//! 騰訊雲 COS 物件上傳下載 adapter

pub mod auth;

use crate::config::CosConfig;
use crate::domain::ports::ObjectStorage;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::validate_object_path;
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use std::path::Path;
use url::Url;

/// 簽名有效期（秒）
const SIGN_EXPIRE_SECS: i64 = 3600;

pub struct CosClient {
    secret_id: String,
    secret_key: String,
    base_url: String,
    host: String,
    client: Client,
}

impl CosClient {
    pub fn new(config: &CosConfig) -> Result<Self> {
        if config.secret_id.is_empty()
            || config.secret_key.is_empty()
            || config.bucket.is_empty()
            || config.endpoint.is_empty()
        {
            return Err(AdapterError::ConfigError {
                message: "cos config is invalid".to_string(),
            });
        }

        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", config.bucket, config.endpoint),
        };
        let host = Url::parse(&base_url)?
            .host_str()
            .ok_or_else(|| AdapterError::ConfigError {
                message: format!("cos base url has no host: {}", base_url),
            })?
            .to_string();

        Ok(Self {
            secret_id: config.secret_id.clone(),
            secret_key: config.secret_key.clone(),
            base_url,
            host,
            client: Client::new(),
        })
    }

    fn sign(&self, method: &str, uri_path: &str) -> String {
        let start = chrono::Utc::now().timestamp();
        auth::authorization(
            &self.secret_id,
            &self.secret_key,
            method,
            uri_path,
            &self.host,
            start,
            start + SIGN_EXPIRE_SECS,
        )
    }

    fn object_uri(cos_path: &str) -> String {
        format!("/{}", cos_path.trim_start_matches('/'))
    }

    /// 物件的完整訪問 URL
    pub fn object_url(&self, cos_path: &str) -> String {
        format!("{}{}", self.base_url, Self::object_uri(cos_path))
    }

    pub async fn put_object(&self, cos_path: &str, data: &[u8]) -> Result<()> {
        validate_object_path("cos_path", cos_path)?;
        let uri = Self::object_uri(cos_path);

        let response = self
            .client
            .put(format!("{}{}", self.base_url, uri))
            .header("Authorization", self.sign("PUT", &uri))
            .header("Content-Length", data.len())
            .body(data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::CosError {
                status: status.as_u16(),
                message: body,
            });
        }
        tracing::info!("💾 cos: uploaded {} bytes to {}", data.len(), uri);
        Ok(())
    }

    pub async fn put_object_from_file<P: AsRef<Path>>(
        &self,
        cos_path: &str,
        local_path: P,
    ) -> Result<String> {
        let data = tokio::fs::read(local_path).await?;
        self.put_object(cos_path, &data).await?;
        Ok(self.object_url(cos_path))
    }

    pub async fn get_object(&self, cos_path: &str) -> Result<Vec<u8>> {
        validate_object_path("cos_path", cos_path)?;
        let uri = Self::object_uri(cos_path);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, uri))
            .header("Authorization", self.sign("GET", &uri))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::CosError {
                status: status.as_u16(),
                message: body,
            });
        }
        let data = response.bytes().await?.to_vec();
        tracing::info!("📥 cos: downloaded {} bytes from {}", data.len(), uri);
        Ok(data)
    }

    pub async fn get_object_to_file<P: AsRef<Path>>(
        &self,
        cos_path: &str,
        local_path: P,
    ) -> Result<()> {
        let data = self.get_object(cos_path).await?;
        tokio::fs::write(local_path, data).await?;
        Ok(())
    }

    pub async fn head_object(&self, cos_path: &str) -> Result<bool> {
        validate_object_path("cos_path", cos_path)?;
        let uri = Self::object_uri(cos_path);

        let response = self
            .client
            .head(format!("{}{}", self.base_url, uri))
            .header("Authorization", self.sign("HEAD", &uri))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }
        Err(AdapterError::CosError {
            status: status.as_u16(),
            message: "head object failed".to_string(),
        })
    }
}

#[async_trait]
impl ObjectStorage for CosClient {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        self.put_object(key, data).await
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        self.get_object(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.head_object(key).await
    }
}

/// 臨時檔名：{prefix}_{時間戳}_{6 位隨機數}
pub fn generate_temp_filename(prefix: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let random_num: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}_{}_{:06}", prefix, timestamp, random_num)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CosConfig {
        CosConfig {
            secret_id: "AKIDtest".to_string(),
            secret_key: "cossecretkey".to_string(),
            bucket: "examplebucket-125".to_string(),
            endpoint: "cos.ap-guangzhou.myqcloud.com".to_string(),
            base_url: None,
        }
    }

    #[test]
    fn test_bucket_url_construction() {
        let client = CosClient::new(&test_config()).unwrap();
        assert_eq!(
            client.object_url("dir/file.txt"),
            "https://examplebucket-125.cos.ap-guangzhou.myqcloud.com/dir/file.txt"
        );
        assert_eq!(
            client.host,
            "examplebucket-125.cos.ap-guangzhou.myqcloud.com"
        );
    }

    #[test]
    fn test_rejects_incomplete_config() {
        let mut config = test_config();
        config.secret_key = String::new();
        assert!(CosClient::new(&config).is_err());
    }

    #[test]
    fn test_generate_temp_filename() {
        let name = generate_temp_filename("download");
        assert!(name.starts_with("download_"));
        let parts: Vec<&str> = name.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[3].len(), 6);
    }
}

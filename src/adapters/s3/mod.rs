//! AWS S3 物件儲存 adapter（官方 SDK）

use crate::config::S3Config;
use crate::domain::ports::ObjectStorage;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_bucket_name, validate_credential};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::time::Duration;

pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// 以靜態憑證建立 S3 客戶端
    pub async fn connect(config: &S3Config) -> Result<Self> {
        validate_credential("access_key_id", &config.access_key_id)?;
        validate_credential("secret_access_key", &config.secret_access_key)?;
        validate_bucket_name(&config.bucket)?;

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "static",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            // 私有部署或 mock server 走 path-style
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn put_object(&self, key: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(map_sdk_error)?;
        tracing::info!("💾 s3: uploaded {} bytes to {}/{}", data.len(), self.bucket, key);
        Ok(())
    }

    pub async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AdapterError::S3Error {
                code: "BodyReadError".to_string(),
                message: e.to_string(),
            })?
            .into_bytes()
            .to_vec();
        tracing::info!("📥 s3: downloaded {} bytes from {}/{}", data.len(), self.bucket, key);
        Ok(data)
    }

    /// HeadObject；NotFound 視為不存在，其他錯誤照常回傳
    pub async fn object_exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if let Some(service_err) = err.as_service_error() {
                    if service_err.is_not_found() {
                        return Ok(false);
                    }
                }
                Err(map_sdk_error(err))
            }
        }
    }

    pub async fn presigned_get_url(&self, key: &str, expiry: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expiry).map_err(|e| {
            AdapterError::InvalidValueError {
                field: "expiry".to_string(),
                value: format!("{:?}", expiry),
                reason: e.to_string(),
            }
        })?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(map_sdk_error)?;
        Ok(presigned.uri().to_string())
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        self.put_object(key, data).await
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        self.get_object(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.object_exists(key).await
    }
}

fn map_sdk_error<E>(err: SdkError<E>) -> AdapterError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err.as_service_error() {
        Some(service_err) => AdapterError::S3Error {
            code: service_err.code().unwrap_or("Unknown").to_string(),
            message: service_err.message().unwrap_or("no message").to_string(),
        },
        None => AdapterError::S3Error {
            code: "SdkError".to_string(),
            message: err.to_string(),
        },
    }
}

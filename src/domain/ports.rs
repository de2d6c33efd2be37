use crate::utils::error::Result;
use async_trait::async_trait;

/// 物件儲存端口，由 S3 與 COS adapter 實作
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()>;
    async fn download(&self, key: &str) -> Result<Vec<u8>>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

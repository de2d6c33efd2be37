//! access token 獲取與快取

use super::WechatMpClient;
use crate::utils::error::{AdapterError, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// 到期前 5 分鐘提前刷新
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

pub(crate) struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

impl WechatMpClient {
    /// 取得 access token，快取未過期時直接返回
    pub async fn access_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.token_cache.write().await;
        // 等待寫鎖期間可能已有人刷新
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let (token, expires_in) = self.fetch_access_token().await?;
        let ttl = Duration::from_secs(expires_in).saturating_sub(REFRESH_MARGIN);
        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + ttl,
        });
        Ok(token)
    }

    async fn fetch_access_token(&self) -> Result<(String, u64)> {
        let url = format!(
            "{}/cgi-bin/token?grant_type=client_credential&appid={}&secret={}",
            self.base_url, self.app_id, self.app_secret
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response.json().await?;
        if token_response.errcode != 0 {
            return Err(AdapterError::WechatApiError {
                code: token_response.errcode,
                message: token_response.errmsg,
            });
        }
        if token_response.access_token.is_empty() {
            return Err(AdapterError::WechatApiError {
                code: -1,
                message: "access token is empty".to_string(),
            });
        }

        tracing::debug!(
            "🔑 wechat_mp: refreshed access token, expires in {}s",
            token_response.expires_in
        );
        Ok((token_response.access_token, token_response.expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_decoding() {
        let body = r#"{"access_token":"TOKEN123","expires_in":7200}"#;
        let response: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.access_token, "TOKEN123");
        assert_eq!(response.expires_in, 7200);
        assert_eq!(response.errcode, 0);

        let error_body = r#"{"errcode":40013,"errmsg":"invalid appid"}"#;
        let response: TokenResponse = serde_json::from_str(error_body).unwrap();
        assert_eq!(response.errcode, 40013);
        assert!(response.access_token.is_empty());
    }
}

use crate::adapters::wechat_pay::sign;
use crate::config::WechatPayConfig;
use crate::utils::error::{AdapterError, Result};
use reqwest::{Client, Method, StatusCode};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";
const AUTH_TYPE: &str = "WECHATPAY2-SHA256-RSA2048";
const USER_AGENT: &str = "cloud-adapters-wechatpay/0.1";
const NONCE_LENGTH: usize = 32;

/// 微信支付 V3 客戶端：持商戶號、證書序列號與商戶私鑰
pub struct WechatPayClient {
    mch_id: String,
    serial_no: String,
    private_key: RsaPrivateKey,
    platform_public_key: Option<RsaPublicKey>,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    code: String,
    message: String,
}

impl WechatPayClient {
    pub fn new(mch_id: &str, serial_no: &str, private_key_pem: &str) -> Result<Self> {
        let private_key = sign::parse_private_key(private_key_pem)?;
        Ok(Self {
            mch_id: mch_id.to_string(),
            serial_no: serial_no.to_string(),
            private_key,
            platform_public_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        })
    }

    pub fn from_config(config: &WechatPayConfig) -> Result<Self> {
        let mut client = Self::new(
            &config.mch_id,
            &config.cert_serial_no,
            &config.private_key_pem,
        )?;
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// 設定平台公鑰後，可用 [`verify_response`](Self::verify_response) 驗證應答簽名
    pub fn with_platform_public_key(mut self, public_key_pem: &str) -> Result<Self> {
        self.platform_public_key = Some(sign::parse_public_key(public_key_pem)?);
        Ok(self)
    }

    pub fn verify_response(
        &self,
        timestamp: &str,
        nonce: &str,
        body: &str,
        signature: &str,
    ) -> Result<bool> {
        let public_key =
            self.platform_public_key
                .as_ref()
                .ok_or_else(|| AdapterError::ConfigError {
                    message: "platform public key not configured".to_string(),
                })?;
        sign::verify_signature(public_key, timestamp, nonce, body, signature)
    }

    fn build_auth_header(&self, nonce: &str, signature: &str, timestamp: i64) -> String {
        format!(
            "{} mchid=\"{}\",nonce_str=\"{}\",signature=\"{}\",timestamp=\"{}\",serial_no=\"{}\"",
            AUTH_TYPE, self.mch_id, nonce, signature, timestamp, self.serial_no
        )
    }

    /// 簽名並發送一次 V3 請求，回傳狀態碼與原始應答體
    pub(crate) async fn send_request(
        &self,
        method: Method,
        path_with_query: &str,
        body: Option<String>,
    ) -> Result<(StatusCode, String)> {
        let timestamp = chrono::Utc::now().timestamp();
        let nonce = sign::generate_nonce(NONCE_LENGTH);
        let body_str = body.as_deref().unwrap_or("");

        let message = sign::build_sign_message(
            method.as_str(),
            path_with_query,
            timestamp,
            &nonce,
            body_str,
        );
        let signature = sign::sign_message(&self.private_key, &message)?;
        let auth_header = self.build_auth_header(&nonce, &signature, timestamp);

        let url = format!("{}{}", self.base_url, path_with_query);
        tracing::debug!("📡 wechat_pay: {} {}", method, path_with_query);

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", auth_header)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("📡 wechat_pay: response status {}", status);
        Ok((status, body))
    }

    /// 非 2xx 應答統一轉成帶 code/message 的 vendor 錯誤
    pub(crate) fn error_from_response(status: StatusCode, body: &str) -> AdapterError {
        match serde_json::from_str::<VendorError>(body) {
            Ok(vendor) => AdapterError::WechatPayError {
                code: vendor.code,
                message: vendor.message,
            },
            Err(_) => AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.to_string(),
            },
        }
    }
}

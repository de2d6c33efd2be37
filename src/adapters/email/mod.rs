//! 騰訊雲 SES 郵件 adapter：TC3-HMAC-SHA256 簽名

use crate::config::EmailConfig;
use crate::utils::error::{AdapterError, Result};
use crate::utils::tc3;
use crate::utils::validation::{validate_email, validate_non_empty_string};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

pub const BODY_TYPE_TEXT: &str = "text";
pub const BODY_TYPE_HTML: &str = "html";

const SERVICE: &str = "ses";
const API_VERSION: &str = "2020-10-02";
const ACTION_SEND_EMAIL: &str = "SendEmail";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SesClient {
    secret_id: String,
    secret_key: String,
    base_url: String,
    host: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SesEnvelope {
    #[serde(rename = "Response")]
    response: SesResponseBody,
}

#[derive(Debug, Default, Deserialize)]
struct SesResponseBody {
    #[serde(rename = "Error", default)]
    error: Option<SesError>,
    #[serde(rename = "MessageId", default)]
    message_id: String,
    #[serde(rename = "RequestId", default)]
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct SesError {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

impl SesClient {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        if config.secret_id.is_empty() || config.secret_key.is_empty() || config.region.is_empty() {
            return Err(AdapterError::ConfigError {
                message: "missing required parameters".to_string(),
            });
        }

        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://ses.{}.tencentcloudapi.com", config.region),
        };
        let host = Url::parse(&base_url)?
            .host_str()
            .ok_or_else(|| AdapterError::ConfigError {
                message: format!("ses base url has no host: {}", base_url),
            })?
            .to_string();

        Ok(Self {
            secret_id: config.secret_id.clone(),
            secret_key: config.secret_key.clone(),
            base_url,
            host,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
        })
    }

    /// 組 TC3 Authorization 頭。時間戳由呼叫端給定，便於測試。
    fn authorization(&self, action: &str, payload: &[u8], timestamp: i64) -> String {
        let date = tc3::utc_date(timestamp);

        let canonical_headers = format!(
            "content-type:application/json\nhost:{}\nx-tc-action:{}\n",
            self.host,
            action.to_lowercase()
        );
        let signed_headers = "content-type;host;x-tc-action";
        let hashed_payload = tc3::sha256_hex(payload);
        let canonical_request = format!(
            "POST\n/\n\n{}\n{}\n{}",
            canonical_headers, signed_headers, hashed_payload
        );

        let credential_scope = format!("{}/{}/tc3_request", date, SERVICE);
        let string_to_sign = tc3::string_to_sign(timestamp, &credential_scope, &canonical_request);
        let signature = tc3::sign(&self.secret_key, &date, SERVICE, &string_to_sign);

        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            tc3::TC3_ALGORITHM,
            self.secret_id,
            credential_scope,
            signed_headers,
            signature
        )
    }

    async fn send_action(&self, action: &str, mut payload: Value) -> Result<SesResponseBody> {
        payload["Action"] = json!(action);
        let payload_bytes = serde_json::to_vec(&payload)?;
        let timestamp = chrono::Utc::now().timestamp();
        let authorization = self.authorization(action, &payload_bytes, timestamp);

        tracing::debug!("📡 ses: POST {} action {}", self.base_url, action);
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .header("Host", &self.host)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", API_VERSION)
            .body(payload_bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: SesEnvelope = serde_json::from_str(&body)?;
        if let Some(error) = envelope.response.error {
            if !error.code.is_empty() {
                return Err(AdapterError::TencentCloudError {
                    code: error.code,
                    message: error.message,
                });
            }
        }
        Ok(envelope.response)
    }
}

/// 郵件發送服務：參數校驗後交給 SES 客戶端
pub struct EmailService {
    client: SesClient,
}

impl EmailService {
    pub fn new(client: SesClient) -> Self {
        Self { client }
    }

    /// 發送郵件，回傳 MessageId
    pub async fn send_email(
        &self,
        from: &str,
        to: &[String],
        subject: &str,
        body: &str,
        body_type: &str,
    ) -> Result<String> {
        validate_parameters(from, to, subject, body, body_type)?;

        let content = BASE64.encode(body.as_bytes());
        let simple = if body_type == BODY_TYPE_HTML {
            json!({ "Html": content })
        } else {
            json!({ "Text": content })
        };
        let payload = json!({
            "FromEmailAddress": from,
            "Destination": to,
            "Subject": subject,
            "Simple": simple,
        });

        let response = self.client.send_action(ACTION_SEND_EMAIL, payload).await?;
        tracing::info!(
            "📧 ses: sent '{}' to {} recipient(s) (request {})",
            subject,
            to.len(),
            response.request_id
        );
        Ok(response.message_id)
    }
}

fn validate_parameters(
    from: &str,
    to: &[String],
    subject: &str,
    body: &str,
    body_type: &str,
) -> Result<()> {
    validate_email("from", from)?;

    if to.is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: "to".to_string(),
            value: String::new(),
            reason: "recipient list cannot be empty".to_string(),
        });
    }
    for email in to {
        validate_email("to", email)?;
    }

    validate_non_empty_string("subject", subject)?;
    validate_non_empty_string("body", body)?;
    if body_type != BODY_TYPE_TEXT && body_type != BODY_TYPE_HTML {
        return Err(AdapterError::InvalidValueError {
            field: "body_type".to_string(),
            value: body_type.to_string(),
            reason: "bodyType must be either 'text' or 'html'".to_string(),
        });
    }
    Ok(())
}

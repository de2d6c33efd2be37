//! 騰訊雲簡訊 adapter：query 參數 HMAC-SHA256 簽名 + 表單提交

use crate::config::SmsConfig;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_phone_number};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

const ACTION_SEND_SMS: &str = "SendSms";
const API_VERSION: &str = "2021-01-11";
const DEFAULT_REGION: &str = "ap-guangzhou";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct SmsClient {
    secret_id: String,
    secret_key: String,
    endpoint: String,
    sign_name: String,
    region: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SmsEnvelope {
    #[serde(rename = "Response")]
    response: SmsResponseBody,
}

#[derive(Debug, Default, Deserialize)]
struct SmsResponseBody {
    #[serde(rename = "Error", default)]
    error: Option<SmsError>,
    #[serde(rename = "RequestId", default)]
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct SmsError {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// 參數按鍵排序後串成 k=v&...，以 secret_key 做 HMAC-SHA256，輸出 hex
fn create_signature(params: &BTreeMap<String, String>, secret_key: &str) -> String {
    let sign_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(sign_string.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn build_send_sms_params(
    template_id: &str,
    phone_number: &str,
    sign_name: &str,
    template_params: &[String],
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("TemplateId".to_string(), template_id.to_string());
    params.insert("PhoneNumberSet.0".to_string(), phone_number.to_string());
    params.insert("SignName".to_string(), sign_name.to_string());
    for (i, param) in template_params.iter().enumerate() {
        params.insert(format!("TemplateParamSet.{}", i), param.clone());
    }
    params
}

impl SmsClient {
    pub fn new(config: &SmsConfig) -> Result<Self> {
        validate_non_empty_string("secret_id", &config.secret_id)?;
        validate_non_empty_string("secret_key", &config.secret_key)?;
        validate_non_empty_string("endpoint", &config.endpoint)?;

        Ok(Self {
            secret_id: config.secret_id.clone(),
            secret_key: config.secret_key.clone(),
            endpoint: config.endpoint.clone(),
            sign_name: config.sign_name.clone(),
            region: config
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
        })
    }

    /// 發送模板簡訊
    pub async fn send_sms(
        &self,
        template_id: &str,
        phone_number: &str,
        template_params: &[String],
    ) -> Result<()> {
        validate_non_empty_string("template_id", template_id)?;
        validate_phone_number("phone_number", phone_number)?;

        let mut params =
            build_send_sms_params(template_id, phone_number, &self.sign_name, template_params);
        params.insert("Action".to_string(), ACTION_SEND_SMS.to_string());
        params.insert("Version".to_string(), API_VERSION.to_string());
        params.insert("Region".to_string(), self.region.clone());

        let body = self.send_request(params).await?;

        let envelope: SmsEnvelope = serde_json::from_str(&body)?;
        if let Some(error) = envelope.response.error {
            if !error.code.is_empty() {
                return Err(AdapterError::TencentCloudError {
                    code: error.code,
                    message: error.message,
                });
            }
        }
        tracing::info!(
            "📨 sms: sent template {} (request {})",
            template_id,
            envelope.response.request_id
        );
        Ok(())
    }

    async fn send_request(&self, params: BTreeMap<String, String>) -> Result<String> {
        let mut full_params = params;
        full_params.insert("SecretId".to_string(), self.secret_id.clone());

        let signature = create_signature(&full_params, &self.secret_key);
        full_params.insert("Signature".to_string(), signature);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&full_params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_known_vector() {
        let mut params = BTreeMap::new();
        params.insert("Action".to_string(), "SendSms".to_string());
        params.insert("PhoneNumberSet.0".to_string(), "+8613711112222".to_string());
        params.insert("Region".to_string(), "ap-guangzhou".to_string());
        params.insert("SecretId".to_string(), "AKIDexample".to_string());
        params.insert("SignName".to_string(), "TestSign".to_string());
        params.insert("TemplateId".to_string(), "449739".to_string());
        params.insert("Version".to_string(), "2021-01-11".to_string());

        assert_eq!(
            create_signature(&params, "Gu5t9xGARNpq86cd98joQYCN3EXAMPLE"),
            "fdc9f81407086c80b50b2b4d477b48adbb4af929524c8c5158728a551c6e09db"
        );
    }

    #[test]
    fn test_build_send_sms_params() {
        let params = build_send_sms_params(
            "449739",
            "+8613711112222",
            "TestSign",
            &["1234".to_string(), "5".to_string()],
        );
        assert_eq!(params.get("TemplateId").unwrap(), "449739");
        assert_eq!(params.get("PhoneNumberSet.0").unwrap(), "+8613711112222");
        assert_eq!(params.get("TemplateParamSet.0").unwrap(), "1234");
        assert_eq!(params.get("TemplateParamSet.1").unwrap(), "5");
    }

    #[test]
    fn test_error_envelope_decoding() {
        let body = r#"{"Response":{"Error":{"Code":"InvalidParameterValue.TemplateParameterFormatError","Message":"bad template"},"RequestId":"abc-123"}}"#;
        let envelope: SmsEnvelope = serde_json::from_str(body).unwrap();
        let error = envelope.response.error.unwrap();
        assert_eq!(error.code, "InvalidParameterValue.TemplateParameterFormatError");

        let ok_body = r#"{"Response":{"RequestId":"abc-123"}}"#;
        let envelope: SmsEnvelope = serde_json::from_str(ok_body).unwrap();
        assert!(envelope.response.error.is_none());
    }
}

//! 模板消息發送

use super::WechatMpClient;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct MiniProgram {
    pub appid: String,
    pub pagepath: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateMessage {
    pub touser: String,
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miniprogram: Option<MiniProgram>,
    /// 模板佔位資料，形如 {"first": {"value": "...", "color": "#173177"}}
    pub data: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
    #[serde(default)]
    msgid: i64,
}

impl WechatMpClient {
    /// 發送模板消息，回傳 msgid
    pub async fn send_template_message(&self, message: &TemplateMessage) -> Result<i64> {
        validate_non_empty_string("touser", &message.touser)?;
        validate_non_empty_string("template_id", &message.template_id)?;

        let access_token = self.access_token().await?;
        let url = format!(
            "{}/cgi-bin/message/template/send?access_token={}",
            self.base_url, access_token
        );

        let response = self.client.post(&url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let send_response: SendResponse = response.json().await?;
        if send_response.errcode != 0 {
            return Err(AdapterError::WechatApiError {
                code: send_response.errcode,
                message: send_response.errmsg,
            });
        }

        tracing::info!(
            "📨 wechat_mp: template message {} sent to {}",
            send_response.msgid,
            message.touser
        );
        Ok(send_response.msgid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serialization() {
        let mut data = HashMap::new();
        data.insert(
            "first".to_string(),
            json!({"value": "訂單已支付", "color": "#173177"}),
        );
        let message = TemplateMessage {
            touser: "o1234567890".to_string(),
            template_id: "TEMPLATE_ID".to_string(),
            url: None,
            miniprogram: None,
            data,
        };
        let body = serde_json::to_value(&message).unwrap();
        assert_eq!(body["touser"], "o1234567890");
        assert!(body.get("url").is_none());
        assert!(body.get("miniprogram").is_none());
        assert_eq!(body["data"]["first"]["value"], "訂單已支付");
    }

    #[test]
    fn test_message_with_miniprogram() {
        let message = TemplateMessage {
            touser: "o1234567890".to_string(),
            template_id: "TEMPLATE_ID".to_string(),
            url: Some("https://example.com/order".to_string()),
            miniprogram: Some(MiniProgram {
                appid: "wxminiapp".to_string(),
                pagepath: "pages/index".to_string(),
            }),
            data: HashMap::new(),
        };
        let body = serde_json::to_value(&message).unwrap();
        assert_eq!(body["url"], "https://example.com/order");
        assert_eq!(body["miniprogram"]["appid"], "wxminiapp");
    }
}

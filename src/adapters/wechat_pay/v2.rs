//! 微信支付 V2 XML 介面（退款），MD5 簽名

use crate::adapters::wechat_pay::sign::generate_nonce;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";
const REFUND_PATH: &str = "/secapi/pay/refund";
const NONCE_LENGTH: usize = 32;

pub struct WechatPayV2Client {
    app_id: String,
    mch_id: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Default)]
pub struct V2RefundRequest {
    pub out_trade_no: Option<String>,
    pub transaction_id: Option<String>,
    pub out_refund_no: String,
    /// 訂單總金額（分）
    pub total_fee: i64,
    /// 退款金額（分）
    pub refund_fee: i64,
    pub refund_desc: Option<String>,
    pub notify_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename = "xml")]
struct XmlRefundRequest {
    appid: String,
    mch_id: String,
    nonce_str: String,
    sign: String,
    sign_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_trade_no: Option<String>,
    out_refund_no: String,
    total_fee: i64,
    refund_fee: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    refund_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notify_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2RefundResponse {
    pub return_code: String,
    #[serde(default)]
    pub return_msg: Option<String>,
    #[serde(default)]
    pub result_code: Option<String>,
    #[serde(default)]
    pub err_code: Option<String>,
    #[serde(default)]
    pub err_code_des: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub out_trade_no: Option<String>,
    #[serde(default)]
    pub out_refund_no: Option<String>,
    #[serde(default)]
    pub refund_id: Option<String>,
    #[serde(default)]
    pub refund_fee: Option<i64>,
    #[serde(default)]
    pub total_fee: Option<i64>,
    #[serde(default)]
    pub cash_fee: Option<i64>,
}

/// V2 MD5 簽名：非空參數按鍵排序串接，末尾加 key，MD5 後大寫
pub fn sign_params(params: &BTreeMap<String, String>, api_key: &str) -> String {
    let mut base = String::new();
    for (key, value) in params {
        if key == "sign" || value.is_empty() {
            continue;
        }
        base.push_str(key);
        base.push('=');
        base.push_str(value);
        base.push('&');
    }
    base.push_str("key=");
    base.push_str(api_key);

    format!("{:x}", md5::compute(base.as_bytes())).to_uppercase()
}

impl WechatPayV2Client {
    pub fn new(app_id: &str, mch_id: &str, api_key: &str) -> Result<Self> {
        validate_non_empty_string("app_id", app_id)?;
        validate_non_empty_string("mch_id", mch_id)?;
        validate_non_empty_string("api_key", api_key)?;
        Ok(Self {
            app_id: app_id.to_string(),
            mch_id: mch_id.to_string(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn validate_refund(req: &V2RefundRequest) -> Result<()> {
        validate_non_empty_string("out_refund_no", &req.out_refund_no)?;
        validate_positive_number("total_fee", req.total_fee)?;
        validate_positive_number("refund_fee", req.refund_fee)?;
        let has_trade_no = req.out_trade_no.as_deref().is_some_and(|s| !s.is_empty());
        let has_transaction_id = req.transaction_id.as_deref().is_some_and(|s| !s.is_empty());
        if !has_trade_no && !has_transaction_id {
            return Err(AdapterError::MissingFieldError {
                field: "out_trade_no or transaction_id".to_string(),
            });
        }
        Ok(())
    }

    fn build_request_xml(&self, req: &V2RefundRequest, nonce_str: String) -> Result<String> {
        let mut params = BTreeMap::new();
        params.insert("appid".to_string(), self.app_id.clone());
        params.insert("mch_id".to_string(), self.mch_id.clone());
        params.insert("nonce_str".to_string(), nonce_str.clone());
        params.insert("sign_type".to_string(), "MD5".to_string());
        params.insert(
            "transaction_id".to_string(),
            req.transaction_id.clone().unwrap_or_default(),
        );
        params.insert(
            "out_trade_no".to_string(),
            req.out_trade_no.clone().unwrap_or_default(),
        );
        params.insert("out_refund_no".to_string(), req.out_refund_no.clone());
        params.insert("total_fee".to_string(), req.total_fee.to_string());
        params.insert("refund_fee".to_string(), req.refund_fee.to_string());
        params.insert(
            "refund_desc".to_string(),
            req.refund_desc.clone().unwrap_or_default(),
        );
        params.insert(
            "notify_url".to_string(),
            req.notify_url.clone().unwrap_or_default(),
        );

        let sign = sign_params(&params, &self.api_key);
        let xml_request = XmlRefundRequest {
            appid: self.app_id.clone(),
            mch_id: self.mch_id.clone(),
            nonce_str,
            sign,
            sign_type: "MD5".to_string(),
            transaction_id: req.transaction_id.clone().filter(|s| !s.is_empty()),
            out_trade_no: req.out_trade_no.clone().filter(|s| !s.is_empty()),
            out_refund_no: req.out_refund_no.clone(),
            total_fee: req.total_fee,
            refund_fee: req.refund_fee,
            refund_desc: req.refund_desc.clone().filter(|s| !s.is_empty()),
            notify_url: req.notify_url.clone().filter(|s| !s.is_empty()),
        };
        quick_xml::se::to_string(&xml_request).map_err(|e| AdapterError::XmlError {
            message: e.to_string(),
        })
    }

    /// 發起 V2 退款
    pub async fn refund(&self, req: &V2RefundRequest) -> Result<V2RefundResponse> {
        Self::validate_refund(req)?;

        let xml_body = self.build_request_xml(req, generate_nonce(NONCE_LENGTH))?;
        let url = format!("{}{}", self.base_url, REFUND_PATH);
        tracing::debug!("📡 wechat_pay_v2: POST {}", REFUND_PATH);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/xml")
            .body(xml_body)
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

        let parsed: V2RefundResponse =
            quick_xml::de::from_str(&body).map_err(|e| AdapterError::XmlError {
                message: e.to_string(),
            })?;
        if parsed.return_code != "SUCCESS" {
            return Err(AdapterError::WechatPayError {
                code: parsed.return_code,
                message: parsed.return_msg.unwrap_or_default(),
            });
        }
        if parsed.result_code.as_deref() != Some("SUCCESS") {
            return Err(AdapterError::WechatPayError {
                code: parsed.err_code.unwrap_or_else(|| "FAIL".to_string()),
                message: parsed.err_code_des.unwrap_or_default(),
            });
        }

        tracing::info!(
            "💰 wechat_pay_v2: refund {} accepted",
            parsed.out_refund_no.as_deref().unwrap_or("")
        );
        Ok(parsed)
    }
}

use crate::adapters::wechat_pay::client::WechatPayClient;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// 下單交易類型，決定 V3 路徑
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    Jsapi,
    Native,
}

impl TradeType {
    pub fn path(&self) -> &'static str {
        match self {
            TradeType::Jsapi => "/v3/pay/transactions/jsapi",
            TradeType::Native => "/v3/pay/transactions/native",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amount {
    pub total: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payer {
    pub openid: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub appid: String,
    pub mchid: String,
    pub description: String,
    pub out_trade_no: String,
    pub notify_url: String,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub prepay_id: Option<String>,
    /// Native 下單回傳二維碼連結而非 prepay_id
    pub code_url: Option<String>,
}

fn validate_create_order(req: &CreateOrderRequest) -> Result<()> {
    validate_non_empty_string("appid", &req.appid)?;
    validate_non_empty_string("mchid", &req.mchid)?;
    validate_non_empty_string("description", &req.description)?;
    validate_non_empty_string("out_trade_no", &req.out_trade_no)?;
    validate_non_empty_string("notify_url", &req.notify_url)?;
    validate_positive_number("amount.total", req.amount.total)?;
    validate_non_empty_string("amount.currency", &req.amount.currency)?;
    Ok(())
}

impl WechatPayClient {
    /// 統一下單
    pub async fn create_order(
        &self,
        trade_type: TradeType,
        req: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse> {
        validate_create_order(req)?;

        let body = serde_json::to_string(req)?;
        let (status, response_body) = self
            .send_request(Method::POST, trade_type.path(), Some(body))
            .await?;

        if !status.is_success() {
            return Err(Self::error_from_response(status, &response_body));
        }

        let response: CreateOrderResponse = serde_json::from_str(&response_body)?;
        tracing::info!("💰 wechat_pay: order {} created", req.out_trade_no);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateOrderRequest {
        CreateOrderRequest {
            appid: "wx1234567890".to_string(),
            mchid: "1900000001".to_string(),
            description: "test order".to_string(),
            out_trade_no: "ORDER123".to_string(),
            notify_url: "https://example.com/notify".to_string(),
            amount: Amount {
                total: 100,
                currency: "CNY".to_string(),
            },
            payer: None,
        }
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut req = valid_request();
        req.appid = String::new();
        assert!(validate_create_order(&req).is_err());

        let mut req = valid_request();
        req.amount.total = 0;
        assert!(validate_create_order(&req).is_err());

        assert!(validate_create_order(&valid_request()).is_ok());
    }

    #[test]
    fn test_trade_type_paths() {
        assert_eq!(TradeType::Jsapi.path(), "/v3/pay/transactions/jsapi");
        assert_eq!(TradeType::Native.path(), "/v3/pay/transactions/native");
    }

    #[test]
    fn test_payer_omitted_when_absent() {
        let body = serde_json::to_string(&valid_request()).unwrap();
        assert!(!body.contains("payer"));
        assert!(body.contains("\"out_trade_no\":\"ORDER123\""));
    }
}

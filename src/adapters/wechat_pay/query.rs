use crate::adapters::wechat_pay::client::WechatPayClient;
use crate::utils::error::{AdapterError, Result};
use reqwest::Method;
use serde::Deserialize;

/// 查單請求：微信單號與商戶單號二選一
#[derive(Debug, Clone, Default)]
pub struct QueryOrderRequest {
    pub transaction_id: Option<String>,
    pub out_trade_no: Option<String>,
    pub mchid: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryAmount {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub payer_total: i64,
    #[serde(default)]
    pub payer_currency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPayer {
    #[serde(default)]
    pub openid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryOrderResponse {
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub mchid: String,
    #[serde(default)]
    pub out_trade_no: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub trade_type: String,
    #[serde(default)]
    pub trade_state: String,
    #[serde(default)]
    pub trade_state_desc: String,
    #[serde(default)]
    pub bank_type: String,
    #[serde(default)]
    pub success_time: String,
    #[serde(default)]
    pub amount: QueryAmount,
    #[serde(default)]
    pub payer: QueryPayer,
}

impl WechatPayClient {
    pub async fn query_order(&self, req: &QueryOrderRequest) -> Result<QueryOrderResponse> {
        if req.mchid.is_empty() {
            return Err(AdapterError::MissingFieldError {
                field: "mchid".to_string(),
            });
        }

        let path = match (&req.transaction_id, &req.out_trade_no) {
            (Some(transaction_id), _) if !transaction_id.is_empty() => format!(
                "/v3/pay/transactions/id/{}?mchid={}",
                transaction_id, req.mchid
            ),
            (_, Some(out_trade_no)) if !out_trade_no.is_empty() => format!(
                "/v3/pay/transactions/out-trade-no/{}?mchid={}",
                out_trade_no, req.mchid
            ),
            _ => {
                return Err(AdapterError::MissingFieldError {
                    field: "transaction_id or out_trade_no".to_string(),
                })
            }
        };

        let (status, body) = self.send_request(Method::GET, &path, None).await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &body));
        }

        let response: QueryOrderResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            "💰 wechat_pay: order {} state {}",
            response.out_trade_no,
            response.trade_state
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_decoding() {
        let body = r#"{
            "appid": "wx1234567890",
            "mchid": "1900000001",
            "out_trade_no": "ORDER123",
            "transaction_id": "4200001234",
            "trade_type": "JSAPI",
            "trade_state": "SUCCESS",
            "trade_state_desc": "支付成功",
            "amount": {"total": 100, "currency": "CNY", "payer_total": 100, "payer_currency": "CNY"},
            "payer": {"openid": "o1234567890"}
        }"#;
        let response: QueryOrderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.trade_state, "SUCCESS");
        assert_eq!(response.amount.total, 100);
        assert_eq!(response.payer.openid, "o1234567890");
        // 缺欄位時也要能解
        let sparse: QueryOrderResponse =
            serde_json::from_str(r#"{"trade_state":"NOTPAY"}"#).unwrap();
        assert_eq!(sparse.trade_state, "NOTPAY");
        assert!(sparse.success_time.is_empty());
    }
}

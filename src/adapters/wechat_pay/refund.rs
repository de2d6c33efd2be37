use crate::adapters::wechat_pay::client::WechatPayClient;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub out_trade_no: String,
    pub out_refund_no: String,
    /// 退款金額（分）
    pub refund: i64,
    /// 原訂單金額（分）
    pub total: i64,
    pub currency: String,
    pub reason: Option<String>,
}

#[derive(Serialize)]
struct RefundAmountBody<'a> {
    refund: i64,
    total: i64,
    currency: &'a str,
}

#[derive(Serialize)]
struct RefundBody<'a> {
    out_trade_no: &'a str,
    out_refund_no: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    amount: RefundAmountBody<'a>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    #[serde(default)]
    pub refund_id: String,
    #[serde(default)]
    pub out_refund_no: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub create_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundQueryResponse {
    #[serde(default)]
    pub refund_id: String,
    #[serde(default)]
    pub out_refund_no: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub success_time: String,
    #[serde(default, rename = "user_received_account")]
    pub user_received_account: String,
}

/// 路徑段轉義，等價 Go 的 url.PathEscape
fn path_escape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn validate_refund(req: &RefundRequest) -> Result<()> {
    validate_non_empty_string("out_trade_no", &req.out_trade_no)?;
    validate_non_empty_string("out_refund_no", &req.out_refund_no)?;
    validate_positive_number("refund", req.refund)?;
    validate_positive_number("total", req.total)?;
    validate_non_empty_string("currency", &req.currency)?;
    Ok(())
}

impl WechatPayClient {
    /// 申請退款
    pub async fn create_refund(&self, req: &RefundRequest) -> Result<RefundResponse> {
        validate_refund(req)?;

        let body = serde_json::to_string(&RefundBody {
            out_trade_no: &req.out_trade_no,
            out_refund_no: &req.out_refund_no,
            reason: req.reason.as_deref(),
            amount: RefundAmountBody {
                refund: req.refund,
                total: req.total,
                currency: &req.currency,
            },
        })?;

        let (status, response_body) = self
            .send_request(Method::POST, "/v3/refund/domestic/refunds", Some(body))
            .await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &response_body));
        }

        let response: RefundResponse = serde_json::from_str(&response_body)?;
        tracing::info!(
            "💰 wechat_pay: refund {} status {}",
            response.out_refund_no,
            response.status
        );
        Ok(response)
    }

    /// 查詢退款狀態，status 統一轉大寫
    pub async fn query_refund(&self, out_refund_no: &str) -> Result<RefundQueryResponse> {
        validate_non_empty_string("out_refund_no", out_refund_no)?;

        let path = format!(
            "/v3/refund/domestic/refunds/{}",
            path_escape(out_refund_no)
        );
        let (status, body) = self.send_request(Method::GET, &path, None).await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &body));
        }

        let mut response: RefundQueryResponse = serde_json::from_str(&body)?;
        response.status = response.status.to_uppercase();
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_escape() {
        assert_eq!(path_escape("R1415757673"), "R1415757673");
        assert_eq!(path_escape("refund/2024 01"), "refund%2F2024%2001");
    }

    #[test]
    fn test_validate_refund() {
        let valid = RefundRequest {
            out_trade_no: "ORDER123".to_string(),
            out_refund_no: "R123".to_string(),
            refund: 50,
            total: 100,
            currency: "CNY".to_string(),
            reason: None,
        };
        assert!(validate_refund(&valid).is_ok());

        let mut bad = valid.clone();
        bad.refund = 0;
        assert!(validate_refund(&bad).is_err());

        let mut bad = valid.clone();
        bad.out_refund_no = String::new();
        assert!(validate_refund(&bad).is_err());
    }

    #[test]
    fn test_refund_body_omits_empty_reason() {
        let body = serde_json::to_string(&RefundBody {
            out_trade_no: "ORDER123",
            out_refund_no: "R123",
            reason: None,
            amount: RefundAmountBody {
                refund: 50,
                total: 100,
                currency: "CNY",
            },
        })
        .unwrap();
        assert!(!body.contains("reason"));
        assert!(body.contains("\"refund\":50"));
    }
}

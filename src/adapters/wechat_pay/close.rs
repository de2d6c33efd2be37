use crate::adapters::wechat_pay::client::WechatPayClient;
use crate::utils::error::Result;
use crate::utils::validation::validate_non_empty_string;
use reqwest::{Method, StatusCode};
use serde::Serialize;

#[derive(Serialize)]
struct CloseOrderBody<'a> {
    mchid: &'a str,
}

impl WechatPayClient {
    /// 關閉訂單。成功時微信回 204 No Content。
    pub async fn close_order(&self, out_trade_no: &str, mchid: &str) -> Result<()> {
        validate_non_empty_string("out_trade_no", out_trade_no)?;
        validate_non_empty_string("mchid", mchid)?;

        let path = format!("/v3/pay/transactions/out-trade-no/{}/close", out_trade_no);
        let body = serde_json::to_string(&CloseOrderBody { mchid })?;

        let (status, response_body) = self.send_request(Method::POST, &path, Some(body)).await?;
        if status != StatusCode::NO_CONTENT {
            return Err(Self::error_from_response(status, &response_body));
        }
        tracing::info!("💰 wechat_pay: order {} closed", out_trade_no);
        Ok(())
    }
}

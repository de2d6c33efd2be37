//! 微信支付 adapter：V3 JSON 介面與 V2 XML 介面

pub mod client;
pub mod close;
pub mod order;
pub mod query;
pub mod refund;
pub mod sign;
pub mod v2;

pub use client::WechatPayClient;
pub use order::{Amount, CreateOrderRequest, CreateOrderResponse, Payer, TradeType};
pub use query::{QueryOrderRequest, QueryOrderResponse};
pub use refund::{RefundQueryResponse, RefundRequest, RefundResponse};
pub use v2::{V2RefundRequest, V2RefundResponse, WechatPayV2Client};

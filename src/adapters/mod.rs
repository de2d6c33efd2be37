// Adapters layer: one self-contained client per vendor API.
// 各 adapter 互不依賴，僅共用 utils 與 domain ports。

pub mod cos;
pub mod email;
pub mod s3;
pub mod sms;
pub mod vector;
pub mod wechat_mp;
pub mod wechat_pay;

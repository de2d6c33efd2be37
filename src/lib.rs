pub mod adapters;
pub mod config;
pub mod domain;
pub mod utils;

pub use adapters::cos::CosClient;
pub use adapters::email::{EmailService, SesClient};
pub use adapters::s3::S3Storage;
pub use adapters::sms::SmsClient;
pub use adapters::vector::VectorClient;
pub use adapters::wechat_mp::WechatMpClient;
pub use adapters::wechat_pay::{WechatPayClient, WechatPayV2Client};
pub use config::AdaptersConfig;
pub use domain::ObjectStorage;
pub use utils::error::{AdapterError, Result};

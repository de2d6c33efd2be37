//! 微信服務號 adapter：access token、模板消息、語音上傳與識別

pub mod template;
pub mod token;
pub mod voice;

use crate::config::WechatMpConfig;
use tokio::sync::RwLock;

pub use template::{MiniProgram, TemplateMessage};
pub use voice::{
    FORMAT_AMR, FORMAT_MP3, FORMAT_SPEEX, FORMAT_WAV, LANGUAGE_EN_US, LANGUAGE_ZH_CN,
};

const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";

pub struct WechatMpClient {
    app_id: String,
    app_secret: String,
    base_url: String,
    client: reqwest::Client,
    token_cache: RwLock<Option<token::CachedToken>>,
}

impl WechatMpClient {
    pub fn new(app_id: &str, app_secret: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            token_cache: RwLock::new(None),
        }
    }

    pub fn from_config(config: &WechatMpConfig) -> Self {
        let mut client = Self::new(&config.app_id, &config.app_secret);
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url);
        }
        client
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{
    validate_credential, validate_non_empty_string, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 各 vendor adapter 的組態集合，按需填寫對應區塊
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptersConfig {
    pub s3: Option<S3Config>,
    pub cos: Option<CosConfig>,
    pub wechat_pay: Option<WechatPayConfig>,
    pub sms: Option<SmsConfig>,
    pub email: Option<EmailConfig>,
    pub vector: Option<VectorConfig>,
    pub wechat_mp: Option<WechatMpConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
    /// 測試或私有部署時覆寫 endpoint
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub bucket: String,
    /// e.g. "cos.ap-guangzhou.myqcloud.com"
    pub endpoint: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WechatPayConfig {
    pub app_id: String,
    pub mch_id: String,
    pub cert_serial_no: String,
    /// PKCS#8 商戶私鑰（PEM 內容）
    pub private_key_pem: String,
    /// v2 XML 介面使用的 API 密鑰
    pub api_v2_key: Option<String>,
    pub notify_url: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub endpoint: String,
    pub sign_name: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub region: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WechatMpConfig {
    pub app_id: String,
    pub app_secret: String,
    pub template_id: Option<String>,
    pub base_url: Option<String>,
}

impl AdaptersConfig {
    /// 從 TOML 檔案載入組態並校驗
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: AdaptersConfig =
            toml::from_str(&content).map_err(|e| AdapterError::ConfigError {
                message: format!("Failed to parse config file: {}", e),
            })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 環境變數優先於檔案內容，密鑰不必落盤
    pub fn apply_env_overrides(&mut self) {
        if let Some(s3) = &mut self.s3 {
            if let Ok(v) = std::env::var("AWS_ACCESS_KEY_ID") {
                s3.access_key_id = v;
            }
            if let Ok(v) = std::env::var("AWS_SECRET_ACCESS_KEY") {
                s3.secret_access_key = v;
            }
        }
        if let Some(cos) = &mut self.cos {
            if let Ok(v) = std::env::var("COS_SECRET_ID") {
                cos.secret_id = v;
            }
            if let Ok(v) = std::env::var("COS_SECRET_KEY") {
                cos.secret_key = v;
            }
        }
        if let Some(sms) = &mut self.sms {
            if let Ok(v) = std::env::var("TENCENTCLOUD_SECRET_ID") {
                sms.secret_id = v;
            }
            if let Ok(v) = std::env::var("TENCENTCLOUD_SECRET_KEY") {
                sms.secret_key = v;
            }
        }
        if let Some(email) = &mut self.email {
            if let Ok(v) = std::env::var("TENCENTCLOUD_SECRET_ID") {
                email.secret_id = v;
            }
            if let Ok(v) = std::env::var("TENCENTCLOUD_SECRET_KEY") {
                email.secret_key = v;
            }
        }
        if let Some(wechat_mp) = &mut self.wechat_mp {
            if let Ok(v) = std::env::var("WECHAT_APP_SECRET") {
                wechat_mp.app_secret = v;
            }
        }
    }
}

impl Validate for AdaptersConfig {
    fn validate(&self) -> Result<()> {
        if let Some(s3) = &self.s3 {
            s3.validate()?;
        }
        if let Some(cos) = &self.cos {
            cos.validate()?;
        }
        if let Some(wechat_pay) = &self.wechat_pay {
            wechat_pay.validate()?;
        }
        if let Some(sms) = &self.sms {
            sms.validate()?;
        }
        if let Some(email) = &self.email {
            email.validate()?;
        }
        if let Some(vector) = &self.vector {
            vector.validate()?;
        }
        if let Some(wechat_mp) = &self.wechat_mp {
            wechat_mp.validate()?;
        }
        Ok(())
    }
}

impl Validate for S3Config {
    fn validate(&self) -> Result<()> {
        validate_credential("s3.access_key_id", &self.access_key_id)?;
        validate_credential("s3.secret_access_key", &self.secret_access_key)?;
        validate_non_empty_string("s3.region", &self.region)?;
        crate::utils::validation::validate_bucket_name(&self.bucket)?;
        if let Some(endpoint) = &self.endpoint_url {
            validate_url("s3.endpoint_url", endpoint)?;
        }
        Ok(())
    }
}

impl Validate for CosConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("cos.secret_id", &self.secret_id)?;
        validate_non_empty_string("cos.secret_key", &self.secret_key)?;
        validate_non_empty_string("cos.bucket", &self.bucket)?;
        validate_non_empty_string("cos.endpoint", &self.endpoint)?;
        if let Some(base_url) = &self.base_url {
            validate_url("cos.base_url", base_url)?;
        }
        Ok(())
    }
}

impl Validate for WechatPayConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("wechat_pay.app_id", &self.app_id)?;
        validate_non_empty_string("wechat_pay.mch_id", &self.mch_id)?;
        validate_non_empty_string("wechat_pay.cert_serial_no", &self.cert_serial_no)?;
        validate_non_empty_string("wechat_pay.private_key_pem", &self.private_key_pem)?;
        if let Some(notify_url) = &self.notify_url {
            validate_url("wechat_pay.notify_url", notify_url)?;
        }
        if let Some(base_url) = &self.base_url {
            validate_url("wechat_pay.base_url", base_url)?;
        }
        Ok(())
    }
}

impl Validate for SmsConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("sms.secret_id", &self.secret_id)?;
        validate_non_empty_string("sms.secret_key", &self.secret_key)?;
        validate_url("sms.endpoint", &self.endpoint)?;
        validate_non_empty_string("sms.sign_name", &self.sign_name)?;
        Ok(())
    }
}

impl Validate for EmailConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("email.secret_id", &self.secret_id)?;
        validate_non_empty_string("email.secret_key", &self.secret_key)?;
        validate_non_empty_string("email.region", &self.region)?;
        if let Some(base_url) = &self.base_url {
            validate_url("email.base_url", base_url)?;
        }
        Ok(())
    }
}

impl Validate for VectorConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("vector.secret_id", &self.secret_id)?;
        validate_non_empty_string("vector.secret_key", &self.secret_key)?;
        validate_url("vector.endpoint", &self.endpoint)?;
        Ok(())
    }
}

impl Validate for WechatMpConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("wechat_mp.app_id", &self.app_id)?;
        validate_non_empty_string("wechat_mp.app_secret", &self.app_secret)?;
        if let Some(base_url) = &self.base_url {
            validate_url("wechat_mp.base_url", base_url)?;
        }
        Ok(())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML error: {message}")]
    XmlError { message: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Request signing failed: {message}")]
    SigningError { message: String },

    #[error("S3 error [{code}]: {message}")]
    S3Error { code: String, message: String },

    #[error("COS request failed with status {status}: {message}")]
    CosError { status: u16, message: String },

    #[error("WeChat Pay error [{code}]: {message}")]
    WechatPayError { code: String, message: String },

    #[error("WeChat API error [{code}]: {message}")]
    WechatApiError { code: i64, message: String },

    #[error("Tencent Cloud API error [{code}]: {message}")]
    TencentCloudError { code: String, message: String },

    #[error("Vector DB error {code}: {message}")]
    VectorDbError { code: i64, message: String },

    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, AdapterError>;

/// 判斷錯誤是否可重試（僅分類，不執行重試）
pub fn is_retryable(err: &AdapterError) -> bool {
    const RETRYABLE_CODES: [&str; 4] = [
        "TooManyRequests",
        "RateLimitExceeded",
        "Timeout",
        "ServiceUnavailable",
    ];

    match err {
        AdapterError::Http(e) => e.is_timeout() || e.is_connect(),
        AdapterError::TencentCloudError { code, .. } => {
            if let Ok(status) = code.parse::<u16>() {
                (500..600).contains(&status)
            } else {
                RETRYABLE_CODES.contains(&code.as_str())
            }
        }
        AdapterError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_vendor_codes() {
        let err = AdapterError::TencentCloudError {
            code: "TooManyRequests".to_string(),
            message: "slow down".to_string(),
        };
        assert!(is_retryable(&err));

        let err = AdapterError::TencentCloudError {
            code: "InvalidParameter".to_string(),
            message: "bad request".to_string(),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_retryable_numeric_codes() {
        let err = AdapterError::TencentCloudError {
            code: "503".to_string(),
            message: "unavailable".to_string(),
        };
        assert!(is_retryable(&err));

        let err = AdapterError::TencentCloudError {
            code: "404".to_string(),
            message: "not found".to_string(),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_retryable_server_status() {
        let err = AdapterError::UnexpectedStatus {
            status: 502,
            body: String::new(),
        };
        assert!(is_retryable(&err));

        let err = AdapterError::WechatPayError {
            code: "PARAM_ERROR".to_string(),
            message: "bad".to_string(),
        };
        assert!(!is_retryable(&err));
    }
}

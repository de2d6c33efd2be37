use crate::utils::error::{AdapterError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AdapterError::InvalidValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be positive".to_string(),
        });
    }
    Ok(())
}

/// 雲端 AK/SK 憑證校驗：非空且長度至少 16
pub fn validate_credential(field_name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Credential cannot be empty".to_string(),
        });
    }
    if value.len() < 16 {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Credential format invalid: minimum length 16 characters".to_string(),
        });
    }
    Ok(())
}

pub fn validate_email(field_name: &str, email: &str) -> Result<()> {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    });

    if email.is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: email.to_string(),
            reason: "Email cannot be empty".to_string(),
        });
    }
    if !re.is_match(email) {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: email.to_string(),
            reason: "Invalid email format".to_string(),
        });
    }
    Ok(())
}

/// S3 bucket 命名規則：3-63 字元，小寫字母/數字開頭結尾
pub fn validate_bucket_name(bucket: &str) -> Result<()> {
    static BUCKET_RE: OnceLock<Regex> = OnceLock::new();
    let re = BUCKET_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9.-]+[a-z0-9]$").unwrap());

    if bucket.is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: "bucket".to_string(),
            value: bucket.to_string(),
            reason: "Bucket name cannot be empty".to_string(),
        });
    }
    if bucket.len() < 3 || bucket.len() > 63 {
        return Err(AdapterError::InvalidValueError {
            field: "bucket".to_string(),
            value: bucket.to_string(),
            reason: "Bucket name must be between 3 and 63 characters".to_string(),
        });
    }
    if !re.is_match(bucket) {
        return Err(AdapterError::InvalidValueError {
            field: "bucket".to_string(),
            value: bucket.to_string(),
            reason: "Bucket name contains invalid characters or format".to_string(),
        });
    }
    Ok(())
}

/// 物件路徑校驗：非空且不含 Windows 非法字元
pub fn validate_object_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    const INVALID_CHARS: &str = "<>:\"|?*\\";
    if let Some(c) = path.chars().find(|c| INVALID_CHARS.contains(*c)) {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: format!("Path contains invalid character: '{}'", c),
        });
    }
    Ok(())
}

pub fn validate_phone_number(field_name: &str, phone: &str) -> Result<()> {
    if phone.is_empty() {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: phone.to_string(),
            reason: "Phone number cannot be empty".to_string(),
        });
    }
    if !phone.chars().all(|c| c.is_ascii_digit() || c == '+') {
        return Err(AdapterError::InvalidValueError {
            field: field_name.to_string(),
            value: phone.to_string(),
            reason: "Phone number may only contain digits and '+'".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint", "https://example.com").is_ok());
        assert!(validate_url("endpoint", "http://example.com").is_ok());
        assert!(validate_url("endpoint", "").is_err());
        assert!(validate_url("endpoint", "invalid-url").is_err());
        assert!(validate_url("endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_credential() {
        assert!(validate_credential("access_key", "AKIDEXAMPLE12345678").is_ok());
        assert!(validate_credential("access_key", "").is_err());
        assert!(validate_credential("access_key", "short").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("from", "test@example.com").is_ok());
        assert!(validate_email("from", "a.b+c@mail.example.co").is_ok());
        assert!(validate_email("from", "").is_err());
        assert!(validate_email("from", "invalid-email").is_err());
        assert!(validate_email("from", "no@tld").is_err());
    }

    #[test]
    fn test_validate_bucket_name() {
        assert!(validate_bucket_name("my-bucket-01").is_ok());
        assert!(validate_bucket_name("").is_err());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("UpperCase").is_err());
        assert!(validate_bucket_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_validate_object_path() {
        assert!(validate_object_path("cos_path", "dir/file.txt").is_ok());
        assert!(validate_object_path("cos_path", "").is_err());
        assert!(validate_object_path("cos_path", "bad|name").is_err());
        assert!(validate_object_path("cos_path", "bad?name").is_err());
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("phone", "+8613711112222").is_ok());
        assert!(validate_phone_number("phone", "").is_err());
        assert!(validate_phone_number("phone", "123-456").is_err());
    }
}

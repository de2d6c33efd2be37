//! TC3-HMAC-SHA256 簽名基礎函數（騰訊雲 SES / 向量庫共用）

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const TC3_ALGORITHM: &str = "TC3-HMAC-SHA256";

/// SHA-256 of the empty payload, used by GET-style canonical requests
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn hmac_sha256(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// 密鑰派生鏈：TC3{secret_key} → date → service → tc3_request
pub fn derive_signing_key(secret_key: &str, date: &str, service: &str) -> Vec<u8> {
    let secret_date = hmac_sha256(format!("TC3{}", secret_key).as_bytes(), date);
    let secret_service = hmac_sha256(&secret_date, service);
    hmac_sha256(&secret_service, "tc3_request")
}

pub fn string_to_sign(timestamp: i64, credential_scope: &str, canonical_request: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        TC3_ALGORITHM,
        timestamp,
        credential_scope,
        sha256_hex(canonical_request.as_bytes())
    )
}

pub fn sign(secret_key: &str, date: &str, service: &str, string_to_sign: &str) -> String {
    let signing_key = derive_signing_key(secret_key, date, service);
    hex::encode(hmac_sha256(&signing_key, string_to_sign))
}

/// 時間戳對應的 UTC 日期（憑證範圍使用）
pub fn utc_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

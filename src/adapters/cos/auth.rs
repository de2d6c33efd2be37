//! 騰訊雲 COS q-sign 簽名（對應 cos-go-sdk-v5 AuthorizationTransport 的行為）

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

type HmacSha1 = Hmac<Sha1>;

fn hmac_sha1_hex(key: &[u8], data: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC-SHA1 accepts any key length");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn sha1_hex(data: &str) -> String {
    hex::encode(Sha1::digest(data.as_bytes()))
}

/// RFC 3986 百分號編碼，保留 unreserved 字元
fn url_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// 產生 q-sign Authorization 頭。只簽 host 頭，query 參數列表固定為空。
pub fn authorization(
    secret_id: &str,
    secret_key: &str,
    method: &str,
    uri_path: &str,
    host: &str,
    start: i64,
    end: i64,
) -> String {
    let key_time = format!("{};{}", start, end);
    let sign_key = hmac_sha1_hex(secret_key.as_bytes(), &key_time);

    let http_headers = format!("host={}", url_encode(host));
    let http_string = format!(
        "{}\n{}\n\n{}\n",
        method.to_lowercase(),
        uri_path,
        http_headers
    );
    let string_to_sign = format!("sha1\n{}\n{}\n", key_time, sha1_hex(&http_string));
    let signature = hmac_sha1_hex(sign_key.as_bytes(), &string_to_sign);

    format!(
        "q-sign-algorithm=sha1&q-ak={}&q-sign-time={}&q-key-time={}&q-header-list=host&q-url-param-list=&q-signature={}",
        secret_id, key_time, key_time, signature
    )
}

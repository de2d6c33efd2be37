//! 微信支付 V3 簽名：RSA-PKCS1v15-SHA256

use crate::utils::error::{AdapterError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// 解析 PKCS#8 商戶私鑰
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| AdapterError::SigningError {
        message: format!("failed to parse private key: {}", e),
    })
}

/// 解析平台公鑰（SPKI PEM）
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| AdapterError::SigningError {
        message: format!("failed to parse public key: {}", e),
    })
}

/// 請求簽名串：METHOD\npath\ntimestamp\nnonce\nbody\n
pub fn build_sign_message(
    method: &str,
    path_with_query: &str,
    timestamp: i64,
    nonce: &str,
    body: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n",
        method, path_with_query, timestamp, nonce, body
    )
}

pub fn sign_message(private_key: &RsaPrivateKey, message: &str) -> Result<String> {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign(message.as_bytes())
        .map_err(|e| AdapterError::SigningError {
            message: format!("RSA signing failed: {}", e),
        })?;
    Ok(BASE64.encode(signature.to_bytes()))
}

/// 驗證應答簽名，簽名串為 timestamp\nnonce\nbody\n。
/// 簽名不匹配回傳 Ok(false)，base64 解碼失敗才回傳錯誤。
pub fn verify_signature(
    public_key: &RsaPublicKey,
    timestamp: &str,
    nonce: &str,
    body: &str,
    signature_b64: &str,
) -> Result<bool> {
    let sig_bytes = BASE64
        .decode(signature_b64)
        .map_err(|e| AdapterError::SigningError {
            message: format!("invalid signature encoding: {}", e),
        })?;

    let signature = match Signature::try_from(sig_bytes.as_slice()) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };

    let message = format!("{}\n{}\n{}\n", timestamp, nonce, body);
    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
    Ok(verifying_key.verify(message.as_bytes(), &signature).is_ok())
}

pub fn generate_nonce(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

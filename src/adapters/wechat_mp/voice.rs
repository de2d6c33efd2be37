//! 語音素材上傳與識別

use super::WechatMpClient;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::validate_non_empty_string;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

pub const FORMAT_AMR: &str = "amr";
pub const FORMAT_SPEEX: &str = "speex";
pub const FORMAT_MP3: &str = "mp3";
pub const FORMAT_WAV: &str = "wav";

pub const LANGUAGE_ZH_CN: &str = "zh_CN";
pub const LANGUAGE_EN_US: &str = "en_US";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
    #[serde(default)]
    media_id: String,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
    #[serde(default)]
    text: String,
}

async fn validate_voice_file(path: &Path) -> Result<()> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AdapterError::InvalidValueError {
                field: "file_path".to_string(),
                value: path.display().to_string(),
                reason: "file does not exist".to_string(),
            }
        } else {
            AdapterError::Io(e)
        }
    })?;

    if metadata.is_dir() {
        return Err(AdapterError::InvalidValueError {
            field: "file_path".to_string(),
            value: path.display().to_string(),
            reason: "path points to a directory".to_string(),
        });
    }
    if metadata.len() == 0 {
        return Err(AdapterError::InvalidValueError {
            field: "file_path".to_string(),
            value: path.display().to_string(),
            reason: "file is empty".to_string(),
        });
    }
    Ok(())
}

impl WechatMpClient {
    /// 上傳語音素材，回傳 media_id
    pub async fn upload_voice<P: AsRef<Path>>(&self, file_path: P, format: &str) -> Result<String> {
        let path = file_path.as_ref();
        validate_non_empty_string("format", format)?;
        validate_voice_file(path).await?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voice".to_string());
        let data = tokio::fs::read(path).await?;
        let form = Form::new().part("media", Part::bytes(data).file_name(file_name));

        let access_token = self.access_token().await?;
        let url = format!(
            "{}/cgi-bin/media/upload?access_token={}&type={}",
            self.base_url, access_token, format
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let upload_response: UploadResponse = response.json().await?;
        if upload_response.errcode != 0 {
            return Err(AdapterError::WechatApiError {
                code: upload_response.errcode,
                message: upload_response.errmsg,
            });
        }

        tracing::info!("🎙 wechat_mp: uploaded voice media {}", upload_response.media_id);
        Ok(upload_response.media_id)
    }

    /// 識別語音內容，回傳文字結果
    pub async fn recognize_voice(&self, media_id: &str, language: &str) -> Result<String> {
        validate_non_empty_string("media_id", media_id)?;
        validate_non_empty_string("language", language)?;

        let access_token = self.access_token().await?;
        let url = format!(
            "{}/cgi-bin/media/voice/recognize?access_token={}",
            self.base_url, access_token
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({ "media_id": media_id, "lang": language }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let recognition: RecognitionResponse = response.json().await?;
        if recognition.errcode != 0 {
            return Err(AdapterError::WechatApiError {
                code: recognition.errcode,
                message: recognition.errmsg,
            });
        }
        Ok(recognition.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_validate_voice_file() {
        let dir = tempfile::tempdir().unwrap();

        // 不存在
        let missing = dir.path().join("missing.amr");
        assert!(validate_voice_file(&missing).await.is_err());

        // 目錄
        assert!(validate_voice_file(dir.path()).await.is_err());

        // 空檔案
        let empty = dir.path().join("empty.amr");
        std::fs::File::create(&empty).unwrap();
        assert!(validate_voice_file(&empty).await.is_err());

        // 正常檔案
        let valid = dir.path().join("voice.amr");
        let mut file = std::fs::File::create(&valid).unwrap();
        file.write_all(b"fake amr data").unwrap();
        assert!(validate_voice_file(&valid).await.is_ok());
    }
}

use anyhow::Result;
use cloud_adapters::adapters::email::{EmailService, SesClient};
use cloud_adapters::config::EmailConfig;
use cloud_adapters::utils::error::is_retryable;
use cloud_adapters::AdapterError;
use httpmock::prelude::*;

fn email_service(base_url: String) -> EmailService {
    let client = SesClient::new(&EmailConfig {
        secret_id: "AKIDexample".to_string(),
        secret_key: "testSecretKey".to_string(),
        region: "ap-hongkong".to_string(),
        base_url: Some(base_url),
    })
    .unwrap();
    EmailService::new(client)
}

/// 發送成功：TC3 簽名頭齊全，回傳 MessageId
#[tokio::test]
async fn test_send_email_success() -> Result<()> {
    let server = MockServer::start();

    let email_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .header("x-tc-action", "SendEmail")
            .header("x-tc-version", "2020-10-02")
            .header_exists("x-tc-timestamp")
            .header_exists("authorization")
            .json_body_partial(r#"{"Action": "SendEmail", "FromEmailAddress": "noreply@example.com"}"#);
        then.status(200).json_body(serde_json::json!({
            "Response": {"MessageId": "qcloud-ses-messageid-123", "RequestId": "req-1"}
        }));
    });

    let service = email_service(server.base_url());
    let message_id = service
        .send_email(
            "noreply@example.com",
            &["user@example.com".to_string()],
            "訂單通知",
            "<p>您的訂單已發貨</p>",
            "html",
        )
        .await?;

    assert_eq!(message_id, "qcloud-ses-messageid-123");
    email_mock.assert();
    Ok(())
}

/// vendor 錯誤映射與可重試分類
#[tokio::test]
async fn test_send_email_vendor_error() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(200).json_body(serde_json::json!({
            "Response": {
                "Error": {"Code": "RateLimitExceeded", "Message": "頻率超限"},
                "RequestId": "req-2"
            }
        }));
    });

    let service = email_service(server.base_url());
    let err = service
        .send_email(
            "noreply@example.com",
            &["user@example.com".to_string()],
            "Subject",
            "Body",
            "text",
        )
        .await
        .unwrap_err();

    match &err {
        AdapterError::TencentCloudError { code, .. } => assert_eq!(code, "RateLimitExceeded"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(is_retryable(&err));
    Ok(())
}

/// 參數校驗不發請求
#[test]
fn test_send_email_validation() {
    let service = email_service("http://localhost:1".to_string());
    let to = vec!["user@example.com".to_string()];

    let cases: Vec<(&str, Vec<String>, &str, &str, &str)> = vec![
        ("", to.clone(), "Subject", "Body", "text"),
        ("invalid-email", to.clone(), "Subject", "Body", "text"),
        ("a@example.com", vec![], "Subject", "Body", "text"),
        ("a@example.com", vec!["bad".to_string()], "Subject", "Body", "text"),
        ("a@example.com", to.clone(), "", "Body", "text"),
        ("a@example.com", to.clone(), "Subject", "", "text"),
        ("a@example.com", to.clone(), "Subject", "Body", "markdown"),
    ];

    for (from, to, subject, body, body_type) in cases {
        let result =
            tokio_test::block_on(service.send_email(from, &to, subject, body, body_type));
        assert!(result.is_err(), "expected validation error for from={}", from);
    }
}

use anyhow::Result;
use cloud_adapters::config::CosConfig;
use cloud_adapters::{AdapterError, CosClient, ObjectStorage};
use httpmock::prelude::*;

fn cos_client(base_url: String) -> CosClient {
    CosClient::new(&CosConfig {
        secret_id: "AKIDtest".to_string(),
        secret_key: "cossecretkey".to_string(),
        bucket: "examplebucket-125".to_string(),
        endpoint: "cos.ap-guangzhou.myqcloud.com".to_string(),
        base_url: Some(base_url),
    })
    .unwrap()
}

/// 上傳：PUT 帶 q-sign Authorization
#[tokio::test]
async fn test_put_object() -> Result<()> {
    let server = MockServer::start();

    let put_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/dir/report.txt")
            .header_exists("authorization")
            .body("monthly report");
        then.status(200);
    });

    let client = cos_client(server.base_url());
    client.put_object("dir/report.txt", b"monthly report").await?;
    put_mock.assert();
    Ok(())
}

/// 下載與寫入本地檔案
#[tokio::test]
async fn test_get_object_to_file() -> Result<()> {
    let server = MockServer::start();

    let get_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dir/report.txt")
            .header_exists("authorization");
        then.status(200).body("monthly report");
    });

    let dir = tempfile::tempdir()?;
    let local_path = dir.path().join("report.txt");

    let client = cos_client(server.base_url());
    client.get_object_to_file("dir/report.txt", &local_path).await?;

    assert_eq!(std::fs::read_to_string(&local_path)?, "monthly report");
    get_mock.assert();
    Ok(())
}

/// 上傳本地檔案後回傳物件 URL
#[tokio::test]
async fn test_put_object_from_file() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(PUT).path("/uploads/data.bin");
        then.status(200);
    });

    let dir = tempfile::tempdir()?;
    let local_path = dir.path().join("data.bin");
    std::fs::write(&local_path, b"payload")?;

    let client = cos_client(server.base_url());
    let url = client.put_object_from_file("uploads/data.bin", &local_path).await?;
    assert!(url.ends_with("/uploads/data.bin"));
    Ok(())
}

/// 404 映射為 CosError / exists=false
#[tokio::test]
async fn test_missing_object() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/missing.txt");
        then.status(404).body("NoSuchKey");
    });
    server.mock(|when, then| {
        when.method(HEAD).path("/missing.txt");
        then.status(404);
    });

    let client = cos_client(server.base_url());
    let err = client.get_object("missing.txt").await.unwrap_err();
    assert!(matches!(err, AdapterError::CosError { status: 404, .. }));

    assert!(!client.head_object("missing.txt").await?);
    Ok(())
}

/// 透過 ObjectStorage port 使用 COS adapter
#[tokio::test]
async fn test_object_storage_port() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(PUT).path("/port.txt");
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(GET).path("/port.txt");
        then.status(200).body("via port");
    });
    server.mock(|when, then| {
        when.method(HEAD).path("/port.txt");
        then.status(200);
    });

    let storage: Box<dyn ObjectStorage> = Box::new(cos_client(server.base_url()));
    storage.upload("port.txt", b"via port").await?;
    assert_eq!(storage.download("port.txt").await?, b"via port");
    assert!(storage.exists("port.txt").await?);
    Ok(())
}

/// 非法路徑在發請求前被擋下
#[test]
fn test_rejects_invalid_path() {
    let client = cos_client("http://localhost:1".to_string());
    let err = tokio_test::block_on(client.get_object("bad|path")).unwrap_err();
    assert!(matches!(err, AdapterError::InvalidValueError { .. }));
}

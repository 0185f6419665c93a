//! HTTP client for the image host upload API.
//!
//! Provides the [`ImageHost`] transport seam used by the upload pipeline, and
//! [`ApiClient`], its reqwest implementation. Every call issues exactly one
//! request; retries across storage channels are the server's job (`autoRetry`).

pub mod api;
pub mod multipart;

use anyhow::{Context, Result};
use async_trait::async_trait;
use imgbed_core::constants::UPLOAD_FIELD_NAME;
use imgbed_core::{SourceFile, UploadError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

pub use api::{resolve_url, UploadQuery};
pub use multipart::{MultipartBody, MultipartEncoder};

const MAX_LOGGED_ERROR_BODY: usize = 512;

/// Transport that sends one image to the host and returns the decoded JSON body.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Errors: [`UploadError::Http`] for non-2xx, [`UploadError::Network`] for
    /// transport failures, [`UploadError::BadResponse`] when the body is not JSON.
    async fn upload(&self, query: &UploadQuery, file: &SourceFile) -> Result<Value, UploadError>;
}

/// HTTP client for the upload API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("imgbed/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageHost for ApiClient {
    async fn upload(&self, query: &UploadQuery, file: &SourceFile) -> Result<Value, UploadError> {
        let url = query.endpoint_url();
        let multipart = MultipartEncoder::encode(UPLOAD_FIELD_NAME, file);
        let start = std::time::Instant::now();

        tracing::debug!(
            file_name = %file.name(),
            size_bytes = file.byte_size(),
            boundary = %multipart.boundary,
            "Sending upload request"
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, multipart.content_type())
            .body(multipart.body)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate(&error_text, MAX_LOGGED_ERROR_BODY),
                "Upload request rejected"
            );
            return Err(UploadError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Network(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(
            status = status.as_u16(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload request completed"
        );

        serde_json::from_str(&text)
            .map_err(|e| UploadError::BadResponse(format!("response is not JSON: {}", e)))
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgbed_core::UploadConfiguration;
    use mockito::Matcher;

    fn query_for(api_url: String) -> UploadQuery {
        UploadQuery::from_config(&UploadConfiguration {
            api_url,
            auth_code: "secret".to_string(),
            upload_folder: Some("notes".to_string()),
            ..Default::default()
        })
    }

    fn file() -> SourceFile {
        SourceFile::new("cat.png", "image/png", b"not-really-a-png".to_vec())
    }

    #[tokio::test]
    async fn test_upload_sends_query_and_multipart_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("authCode".into(), "secret".into()),
                Matcher::UrlEncoded("uploadChannel".into(), "telegram".into()),
                Matcher::UrlEncoded("uploadNameType".into(), "default".into()),
                Matcher::UrlEncoded("returnFormat".into(), "default".into()),
                Matcher::UrlEncoded("serverCompress".into(), "true".into()),
                Matcher::UrlEncoded("autoRetry".into(), "true".into()),
                Matcher::UrlEncoded("uploadFolder".into(), "notes".into()),
            ]))
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=.+$".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"file\"; filename=\"cat.png\"".into()),
                Matcher::Regex("Content-Type: image/png".into()),
                Matcher::Regex("not-really-a-png".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"src":"/file/abc.png"}]"#)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::new().unwrap();
        let body = client.upload(&query_for(server.url()), &file()).await.unwrap();

        assert_eq!(body[0]["src"], "/file/abc.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/upload")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = ApiClient::new().unwrap();
        let err = client
            .upload(&query_for(server.url()), &file())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            UploadError::Http {
                status: 500,
                status_text: "Internal Server Error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_bad_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/upload")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = ApiClient::new().unwrap();
        let err = client
            .upload(&query_for(server.url()), &file())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::BadResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Nothing listens on port 1.
        let client = ApiClient::new().unwrap();
        let err = client
            .upload(&query_for("http://127.0.0.1:1".to_string()), &file())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Network(_)));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello");
        assert_eq!(truncate("héllo", 2), "hé");
    }
}

//! Upload endpoint request and response shapes.

use imgbed_core::{ReturnFormat, UploadConfiguration, UploadError};
use serde_json::Value;

/// Query parameters of `POST {apiUrl}/upload`, captured from one configuration snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadQuery {
    pub api_url: String,
    pub auth_code: String,
    pub upload_channel: String,
    pub upload_name_type: String,
    pub return_format: ReturnFormat,
    pub server_compress: bool,
    pub auto_retry: bool,
    pub upload_folder: Option<String>,
}

impl UploadQuery {
    pub fn from_config(config: &UploadConfiguration) -> Self {
        Self {
            api_url: config.api_url.clone(),
            auth_code: config.auth_code.clone(),
            upload_channel: config.upload_channel.as_str().to_string(),
            upload_name_type: config.upload_name_type.as_str().to_string(),
            return_format: config.return_format,
            server_compress: config.server_compress,
            auto_retry: config.auto_retry,
            upload_folder: config.upload_folder().map(String::from),
        }
    }

    /// Parameters in the order the server documents them.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("authCode", self.auth_code.clone()),
            ("uploadChannel", self.upload_channel.clone()),
            ("uploadNameType", self.upload_name_type.clone()),
            ("returnFormat", self.return_format.as_str().to_string()),
            ("serverCompress", self.server_compress.to_string()),
            ("autoRetry", self.auto_retry.to_string()),
        ];
        if let Some(folder) = &self.upload_folder {
            pairs.push(("uploadFolder", folder.clone()));
        }
        pairs
    }

    pub fn query_string(&self) -> String {
        self.pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full request URL. `api_url` is used verbatim.
    pub fn endpoint_url(&self) -> String {
        format!("{}/upload?{}", self.api_url, self.query_string())
    }
}

/// Turn the upload response body into the canonical URL of the stored image.
///
/// The body must be a JSON array whose first element carries a non-empty `src`.
/// With [`ReturnFormat::Full`] the `src` is already absolute; otherwise it is
/// appended to `api_url` as-is.
pub fn resolve_url(
    body: &Value,
    api_url: &str,
    return_format: ReturnFormat,
) -> Result<String, UploadError> {
    let items = body
        .as_array()
        .ok_or_else(|| UploadError::BadResponse("expected a JSON array".to_string()))?;

    let first = items
        .first()
        .ok_or_else(|| UploadError::BadResponse("empty response array".to_string()))?;

    let src = first
        .get("src")
        .and_then(Value::as_str)
        .filter(|src| !src.is_empty())
        .ok_or_else(|| UploadError::BadResponse("missing 'src' in first element".to_string()))?;

    Ok(match return_format {
        ReturnFormat::Full => src.to_string(),
        ReturnFormat::Default => format!("{}{}", api_url, src),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgbed_core::UploadChannel;
    use serde_json::json;

    fn config() -> UploadConfiguration {
        UploadConfiguration {
            api_url: "https://host".to_string(),
            auth_code: "a b&c".to_string(),
            upload_channel: UploadChannel::S3,
            ..Default::default()
        }
    }

    #[test]
    fn test_query_without_folder() {
        let query = UploadQuery::from_config(&config());
        assert_eq!(
            query.query_string(),
            "authCode=a%20b%26c&uploadChannel=s3&uploadNameType=default&returnFormat=default&serverCompress=true&autoRetry=true"
        );
        assert!(query.endpoint_url().starts_with("https://host/upload?authCode="));
    }

    #[test]
    fn test_query_with_folder() {
        let config = UploadConfiguration {
            upload_folder: Some("blog/2024".to_string()),
            auto_retry: false,
            ..config()
        };
        let query = UploadQuery::from_config(&config);
        let pairs = query.pairs();
        assert_eq!(pairs.last().unwrap(), &("uploadFolder", "blog/2024".to_string()));
        assert!(query.query_string().contains("autoRetry=false"));
        assert!(query.query_string().ends_with("uploadFolder=blog%2F2024"));
    }

    #[test]
    fn test_blank_folder_is_omitted() {
        let config = UploadConfiguration {
            upload_folder: Some("   ".to_string()),
            ..config()
        };
        let query = UploadQuery::from_config(&config);
        assert!(!query.query_string().contains("uploadFolder"));
    }

    #[test]
    fn test_resolve_full_url_verbatim() {
        let body = json!([{ "src": "https://cdn.example/x.png" }]);
        let url = resolve_url(&body, "https://host", ReturnFormat::Full).unwrap();
        assert_eq!(url, "https://cdn.example/x.png");
    }

    #[test]
    fn test_resolve_default_concatenates() {
        let body = json!([{ "src": "/file/abc" }]);
        let url = resolve_url(&body, "https://host", ReturnFormat::Default).unwrap();
        assert_eq!(url, "https://host/file/abc");
    }

    #[test]
    fn test_resolve_does_not_normalize_slashes() {
        let body = json!([{ "src": "/file/abc" }]);
        let url = resolve_url(&body, "https://host/", ReturnFormat::Default).unwrap();
        assert_eq!(url, "https://host//file/abc");
    }

    #[test]
    fn test_resolve_bad_shapes() {
        for body in [
            json!([]),
            json!({ "src": "/file/abc" }),
            json!([{ "url": "/file/abc" }]),
            json!([{ "src": "" }]),
            json!([{ "src": 42 }]),
            json!(null),
        ] {
            let result = resolve_url(&body, "https://host", ReturnFormat::Default);
            assert!(
                matches!(result, Err(UploadError::BadResponse(_))),
                "body {} should be rejected",
                body
            );
        }
    }
}

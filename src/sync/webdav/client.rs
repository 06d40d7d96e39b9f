use reqwest::{Client, Method, StatusCode};
use thiserror::Error;

use crate::sync::config::SyncCredentials;
use crate::sync::paths;

/// WebDAV client for drop uploads
pub struct WebDAVClient {
    client: Client,
    base_url: String,
    credentials: SyncCredentials,
}

#[derive(Error, Debug)]
pub enum WebDAVError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication failed")]
    AuthFailed,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl WebDAVClient {
    /// Create a new WebDAV client
    pub fn new(base_url: String, credentials: SyncCredentials) -> Result<Self, WebDAVError> {
        // Normalize URL - ensure no trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(WebDAVError::InvalidUrl("URL must start with http:// or https://".to_string()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build full URL for a path, encoding each segment
    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, paths::encode_remote_path(path))
        }
    }

    /// WebDAV extension method. Only called with fixed RFC 4918 tokens.
    fn method(name: &'static str) -> Method {
        Method::from_bytes(name.as_bytes()).expect("WebDAV method names are valid tokens")
    }

    /// Test connection to the WebDAV server
    pub async fn test_connection(&self) -> Result<(), WebDAVError> {
        self.propfind("").await
    }

    /// Depth-0 PROPFIND. Only the status code is inspected.
    pub async fn propfind(&self, path: &str) -> Result<(), WebDAVError> {
        let url = self.url(path);

        let response = self.client
            .request(Self::method("PROPFIND"), &url)
            .header("Depth", "0")
            .header("Content-Type", "application/xml")
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .body(PROPFIND_BODY)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(WebDAVError::AuthFailed),
            StatusCode::NOT_FOUND => Err(WebDAVError::NotFound(path.to_string())),
            status if status.is_success() || status == StatusCode::MULTI_STATUS => Ok(()),
            status => Err(WebDAVError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Check if a resource exists. Errors are logged and read as absent.
    pub async fn exists(&self, path: &str) -> bool {
        match self.propfind(path).await {
            Ok(()) => true,
            Err(WebDAVError::NotFound(_)) => false,
            Err(e) => {
                log::warn!("webdav: existence check for '{}' failed: {}", path, e);
                false
            }
        }
    }

    /// GET - Download file contents
    pub async fn get(&self, path: &str) -> Result<Vec<u8>, WebDAVError> {
        let url = self.url(path);

        let response = self.client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(WebDAVError::AuthFailed);
            }
            StatusCode::NOT_FOUND => {
                return Err(WebDAVError::NotFound(path.to_string()));
            }
            status if !status.is_success() => {
                return Err(WebDAVError::Server {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }
            _ => {}
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// PUT - Upload file contents, replacing any existing resource
    pub async fn put(&self, path: &str, data: Vec<u8>) -> Result<(), WebDAVError> {
        let url = self.url(path);
        let size = data.len();

        let response = self.client
            .put(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .body(bytes::Bytes::from(data))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(WebDAVError::AuthFailed),
            status if status.is_success() => {
                log::debug!("webdav: PUT '{}' ({} bytes) -> {}", path, size, status);
                Ok(())
            }
            status => Err(WebDAVError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// MKCOL - Create a single directory
    pub async fn mkcol(&self, path: &str) -> Result<(), WebDAVError> {
        let url = self.url(path);

        let response = self.client
            .request(Self::method("MKCOL"), &url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => Ok(()),
            StatusCode::METHOD_NOT_ALLOWED => {
                // Directory already exists
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(WebDAVError::AuthFailed),
            status => Err(WebDAVError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Create directory structure recursively, probing each level first
    pub async fn mkdir_p(&self, path: &str) -> Result<(), WebDAVError> {
        let mut current_path = String::new();

        for part in path.split('/').filter(|p| !p.is_empty()) {
            current_path.push('/');
            current_path.push_str(part);

            if self.exists(&current_path).await {
                continue;
            }
            log::debug!("webdav: creating directory '{}'", current_path);
            self.mkcol(&current_path).await?;
        }

        Ok(())
    }
}

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:resourcetype/>
  </D:prop>
</D:propfind>"#;

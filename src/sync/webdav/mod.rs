mod client;

use async_trait::async_trait;

pub use client::{WebDAVClient, WebDAVError};

/// Remote filesystem operations the drop pipeline and the preview overlay need
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Whether a resource exists. Failures of any kind read as `false`.
    async fn exists(&self, path: &str) -> bool;

    /// Create a directory and all missing parents
    async fn create_directory(&self, path: &str) -> Result<(), WebDAVError>;

    /// Upload a file, replacing whatever is there
    async fn put(&self, path: &str, data: Vec<u8>) -> Result<(), WebDAVError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, WebDAVError>;
}

#[async_trait]
impl RemoteStore for WebDAVClient {
    async fn exists(&self, path: &str) -> bool {
        WebDAVClient::exists(self, path).await
    }

    async fn create_directory(&self, path: &str) -> Result<(), WebDAVError> {
        self.mkdir_p(path).await
    }

    async fn put(&self, path: &str, data: Vec<u8>) -> Result<(), WebDAVError> {
        WebDAVClient::put(self, path, data).await
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, WebDAVError> {
        WebDAVClient::get(self, path).await
    }
}

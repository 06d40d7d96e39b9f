use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::webdav::{RemoteStore, WebDAVError};

/// In-memory remote store that records every call
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
    failing: HashSet<String>,
    failing_dirs: HashSet<String>,
    calls: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_file(&self, path: &str, data: Vec<u8>) {
        self.state.lock().unwrap().files.insert(path.to_string(), data);
    }

    /// Make uploads to `path` fail with a server error
    pub fn fail_put(&self, path: &str) {
        self.state.lock().unwrap().failing.insert(path.to_string());
    }

    /// Make MKCOL of `path` fail with a conflict
    pub fn fail_mkdir(&self, path: &str) {
        self.state.lock().unwrap().failing_dirs.insert(path.to_string());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.state.lock().unwrap().dirs.contains(path)
    }

    pub fn dir_count(&self) -> usize {
        self.state.lock().unwrap().dirs.len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn exists(&self, path: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("exists {}", path));
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    async fn create_directory(&self, path: &str) -> Result<(), WebDAVError> {
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current.push('/');
            current.push_str(part);
            if self.exists(&current).await {
                continue;
            }
            let created = {
                let mut state = self.state.lock().unwrap();
                state.calls.push(format!("mkcol {}", current));
                if state.failing_dirs.contains(&current) {
                    return Err(WebDAVError::Server {
                        status: 409,
                        message: "Conflict".to_string(),
                    });
                }
                state.dirs.insert(current.clone())
            };
            if !created {
                return Err(WebDAVError::Server {
                    status: 405,
                    message: "already exists".to_string(),
                });
            }
        }
        Ok(())
    }

    async fn put(&self, path: &str, data: Vec<u8>) -> Result<(), WebDAVError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("put {}", path));
        if state.failing.contains(path) {
            return Err(WebDAVError::Server {
                status: 507,
                message: "Insufficient Storage".to_string(),
            });
        }
        state.files.insert(path.to_string(), data);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, WebDAVError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get {}", path));
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| WebDAVError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_directory_twice() {
        let store = MemoryStore::new();

        store.create_directory("/a/b/c").await.unwrap();
        let dirs_after_first = store.dir_count();
        store.create_directory("/a/b/c").await.unwrap();

        assert_eq!(store.dir_count(), dirs_after_first);
        assert!(store.has_dir("/a/b/c"));
        assert_eq!(store.count_calls("mkcol"), 3);
    }

    #[tokio::test]
    async fn test_fail_mkdir_stops_at_failing_level() {
        let store = MemoryStore::new();
        store.fail_mkdir("/a/b");

        let result = store.create_directory("/a/b/c").await;

        assert!(matches!(result, Err(WebDAVError::Server { status: 409, .. })));
        assert!(store.has_dir("/a"));
        assert!(!store.has_dir("/a/b"));
        assert!(!store.has_dir("/a/b/c"));
    }
}

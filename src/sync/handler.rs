use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::markdown::link;

use super::config::Settings;
use super::paths;
use super::resolver::{self, Decision, DropContext};
use super::webdav::{RemoteStore, WebDAVError};

#[derive(Error, Debug)]
pub enum DropError {
    #[error("WebDAV URL and username must be configured before dropping files")]
    ConfigurationMissing,
    #[error("WebDAV error: {0}")]
    WebDAV(#[from] WebDAVError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not determine a remote destination for {0}")]
    NoDestination(String),
}

/// A file delivered by a drop event
#[async_trait]
pub trait DroppedItem: Send + Sync {
    /// Absolute local path
    fn local_path(&self) -> &str;

    /// Name shown in the inserted link
    fn name(&self) -> &str;

    async fn read_bytes(&self) -> std::io::Result<Vec<u8>>;
}

/// Dropped file read from the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: String,
    name: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let path = path.to_string_lossy().to_string();
        let name = paths::file_name(&path).to_string();
        Self { path, name }
    }
}

#[async_trait]
impl DroppedItem for LocalFile {
    fn local_path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// The document that receives links
pub trait DocumentContext {
    /// Folder of the document, `/` for the root
    fn folder_path(&self) -> String;

    /// Insert text at the cursor and move the cursor past it
    fn insert_at_cursor(&mut self, text: &str);
}

/// Markdown buffer with a cursor
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    folder: String,
    content: String,
    cursor: usize,
}

impl MarkdownDocument {
    /// Cursor defaults to the end of the content and is clamped to a char boundary
    pub fn new(folder: impl Into<String>, content: impl Into<String>, cursor: Option<usize>) -> Self {
        let content = content.into();
        let mut cursor = cursor.unwrap_or(content.len()).min(content.len());
        while !content.is_char_boundary(cursor) {
            cursor -= 1;
        }
        Self {
            folder: folder.into(),
            content,
            cursor,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl DocumentContext for MarkdownDocument {
    fn folder_path(&self) -> String {
        if self.folder.is_empty() {
            "/".to_string()
        } else {
            self.folder.clone()
        }
    }

    fn insert_at_cursor(&mut self, text: &str) {
        self.content.insert_str(self.cursor, text);
        self.cursor += text.len();
    }
}

/// Sink for transient user-visible messages
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::warn!("notice: {}", message);
    }
}

/// Where a single file's handling ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DropState {
    Resolving,
    Uploading,
    Linking,
    LinkingOnly,
    InsertingLocalLink,
    Done,
    Failed,
}

impl fmt::Display for DropState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::Uploading => "uploading",
            Self::Linking => "linking",
            Self::LinkingOnly => "linking-only",
            Self::InsertingLocalLink => "inserting-local-link",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result for one dropped file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub name: String,
    pub local_path: String,
    pub state: DropState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Failure message if state is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcomes for every file of one drop, in drop order
#[derive(Debug, Clone, Default, Serialize)]
pub struct DropReport {
    pub files: Vec<FileOutcome>,
}

impl DropReport {
    pub fn inserted(&self) -> usize {
        self.files.iter().filter(|f| f.link.is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.state == DropState::Failed).count()
    }
}

/// Successful handling of one file, before insertion
struct Handled {
    decision: Decision,
    remote_path: Option<String>,
    link: String,
}

/// Runs the resolve / upload / link pipeline for drop events
pub struct DropHandler<S: RemoteStore, N: Notifier = LogNotifier> {
    store: S,
    notifier: N,
}

impl<S: RemoteStore> DropHandler<S> {
    pub fn new(store: S) -> Self {
        Self::with_notifier(store, LogNotifier)
    }
}

impl<S: RemoteStore, N: Notifier> DropHandler<S, N> {
    pub fn with_notifier(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one drop. Files are processed one at a time in the given order;
    /// a failure only affects its own file.
    pub async fn handle_drop(
        &self,
        settings: &Settings,
        items: &[Box<dyn DroppedItem>],
        document: &mut dyn DocumentContext,
    ) -> Result<DropReport, DropError> {
        if !settings.is_configured() {
            let err = DropError::ConfigurationMissing;
            self.notifier.notify(&err.to_string());
            return Err(err);
        }

        let folder = document.folder_path();
        let mut report = DropReport::default();

        for item in items {
            let outcome = match self.handle_item(settings, &**item, &folder).await {
                Ok(handled) => {
                    // Multiple links land on separate lines
                    if report.inserted() > 0 {
                        document.insert_at_cursor("\n");
                    }
                    document.insert_at_cursor(&handled.link);
                    log::info!(
                        "drop: {} -> {} ({:?})",
                        item.local_path(),
                        handled.remote_path.as_deref().unwrap_or("local"),
                        handled.decision
                    );
                    FileOutcome {
                        name: item.name().to_string(),
                        local_path: item.local_path().to_string(),
                        state: DropState::Done,
                        decision: Some(handled.decision),
                        remote_path: handled.remote_path,
                        link: Some(handled.link),
                        error: None,
                    }
                }
                Err(e) => {
                    log::error!("drop: failed to handle {}: {}", item.local_path(), e);
                    self.notifier
                        .notify(&format!("Failed to handle {}: {}", item.name(), e));
                    FileOutcome {
                        name: item.name().to_string(),
                        local_path: item.local_path().to_string(),
                        state: DropState::Failed,
                        decision: None,
                        remote_path: None,
                        link: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.files.push(outcome);
        }

        Ok(report)
    }

    async fn handle_item(
        &self,
        settings: &Settings,
        item: &dyn DroppedItem,
        folder: &str,
    ) -> Result<Handled, DropError> {
        let ctx = DropContext {
            file_path: item.local_path(),
            document_folder: folder,
        };
        log::debug!("drop: {} {}", DropState::Resolving, item.local_path());
        let resolution = resolver::resolve(&ctx, settings, &self.store).await;

        if resolution.decision == Decision::LocalLink {
            log::debug!("drop: {} {}", DropState::InsertingLocalLink, item.local_path());
            return Ok(Handled {
                decision: Decision::LocalLink,
                remote_path: None,
                link: link::local_link(item.name(), item.local_path()),
            });
        }

        let remote_path = resolution
            .remote_path
            .ok_or_else(|| DropError::NoDestination(item.name().to_string()))?;

        if resolution.decision == Decision::Upload {
            log::debug!("drop: {} {} -> {}", DropState::Uploading, item.local_path(), remote_path);
            let parent = paths::parent_folder(&remote_path);
            if parent != "/" && !parent.is_empty() {
                self.store.create_directory(parent).await?;
            }
            let data = item.read_bytes().await?;
            self.store.put(&remote_path, data).await?;
            log::debug!("drop: {} {}", DropState::Linking, remote_path);
        } else {
            log::debug!("drop: {} {}", DropState::LinkingOnly, remote_path);
        }

        let link = link::remote_link(item.name(), &settings.webdav_url, &remote_path);
        Ok(Handled {
            decision: resolution.decision,
            remote_path: Some(remote_path),
            link,
        })
    }
}

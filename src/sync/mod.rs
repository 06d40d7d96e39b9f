pub mod config;
pub mod handler;
pub mod paths;
pub mod resolver;
pub mod webdav;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{
    ConfigError, PathMapping, PathMode, Settings, SettingsStore, SyncCredentials,
    SyncFolderConfig,
};
pub use handler::{
    DocumentContext, DropError, DropHandler, DropReport, DropState, DroppedItem, FileOutcome,
    LocalFile, LogNotifier, MarkdownDocument, Notifier,
};
pub use resolver::{resolve, resolve_destination, Decision, Destination, DropContext, Resolution};
pub use webdav::{RemoteStore, WebDAVClient, WebDAVError};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
    #[error("Unknown setting: {0}")]
    UnknownKey(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Rule rerouting a local folder prefix to a remote folder
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PathMapping {
    pub local_path: String,
    pub remote_path: String,
}

impl PathMapping {
    pub fn new(local_path: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
        }
    }
}

/// Which folder path resolution keys off
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// The active document's folder
    #[default]
    Note,
    /// The dropped file's own folder
    Local,
}

impl std::str::FromStr for PathMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "local" => Ok(Self::Local),
            _ => Err(ConfigError::InvalidValue {
                key: "pathMode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Single local root <-> remote root correspondence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFolderConfig {
    pub local_sync_folder: String,
    pub remote_sync_folder: String,
}

/// Credentials for WebDAV authentication
#[derive(Debug, Clone)]
pub struct SyncCredentials {
    pub username: String,
    pub password: String,
}

/// User settings. Missing fields in a stored file fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// WebDAV endpoint (e.g., "https://cloud.example.com/remote.php/dav/files/user/")
    pub webdav_url: String,
    pub username: String,
    pub password: String,
    /// Remote folder used when no mapping matches
    pub root_folder: String,
    pub path_mappings: Vec<PathMapping>,
    pub local_sync_folder: String,
    pub remote_sync_folder: String,
    pub path_mode: PathMode,
    /// Link to an already uploaded copy instead of uploading again
    pub prefer_existing_link: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webdav_url: String::new(),
            username: String::new(),
            password: String::new(),
            root_folder: "/".to_string(),
            path_mappings: Vec::new(),
            local_sync_folder: String::new(),
            remote_sync_folder: String::new(),
            path_mode: PathMode::Note,
            prefer_existing_link: false,
        }
    }
}

impl Settings {
    /// Endpoint and username are both required before anything is uploaded
    pub fn is_configured(&self) -> bool {
        !self.webdav_url.trim().is_empty() && !self.username.trim().is_empty()
    }

    pub fn credentials(&self) -> SyncCredentials {
        SyncCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    pub fn sync_folder(&self) -> Option<SyncFolderConfig> {
        if self.local_sync_folder.trim().is_empty() {
            return None;
        }
        Some(SyncFolderConfig {
            local_sync_folder: self.local_sync_folder.clone(),
            remote_sync_folder: self.remote_sync_folder.clone(),
        })
    }

    /// Add a mapping, replacing any rule with the same local path
    pub fn add_mapping(&mut self, mapping: PathMapping) {
        if let Some(existing) = self
            .path_mappings
            .iter_mut()
            .find(|m| m.local_path == mapping.local_path)
        {
            existing.remote_path = mapping.remote_path;
        } else {
            self.path_mappings.push(mapping);
        }
    }

    /// Remove the mapping for a local path. Returns whether one was removed.
    pub fn remove_mapping(&mut self, local_path: &str) -> bool {
        let before = self.path_mappings.len();
        self.path_mappings.retain(|m| m.local_path != local_path);
        self.path_mappings.len() != before
    }

    /// Set a scalar option by its stored (camelCase) name
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "webdavUrl" => self.webdav_url = value.to_string(),
            "username" => self.username = value.to_string(),
            "password" => self.password = value.to_string(),
            "rootFolder" => self.root_folder = value.to_string(),
            "localSyncFolder" => self.local_sync_folder = value.to_string(),
            "remoteSyncFolder" => self.remote_sync_folder = value.to_string(),
            "pathMode" => self.path_mode = value.parse()?,
            "preferExistingLink" => {
                self.prefer_existing_link =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Copy suitable for display, with the password masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.password.is_empty() {
            copy.password = "********".to_string();
        }
        copy
    }
}

/// JSON-file persistence for [`Settings`]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// ~/.config/davdrop/settings.json (platform equivalent elsewhere)
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("davdrop").join("settings.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, returning defaults if the file does not exist yet
    pub fn load(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            log::debug!("settings: {} not found, using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, data)?;
        log::info!("settings: saved to {}", self.path.display());
        Ok(())
    }
}

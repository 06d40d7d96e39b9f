use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use davdrop_lib::sync::{Settings, SettingsStore, WebDAVClient};

/// Shared application state for CLI commands
pub struct App {
    pub store: SettingsStore,
    pub settings: Settings,
}

impl App {
    /// Load settings from `config` or the default location
    pub fn new(config: Option<PathBuf>) -> Result<Self> {
        let path = match config {
            Some(path) => path,
            None => SettingsStore::default_path().context("Failed to locate settings file")?,
        };
        let store = SettingsStore::new(path);
        let settings = store
            .load()
            .with_context(|| format!("Failed to load settings from {}", store.path().display()))?;

        Ok(Self { store, settings })
    }

    /// Persist the current settings
    pub fn save(&self) -> Result<()> {
        self.store
            .save(&self.settings)
            .with_context(|| format!("Failed to save settings to {}", self.store.path().display()))
    }

    /// WebDAV client built from the configured endpoint and credentials
    pub fn client(&self) -> Result<WebDAVClient> {
        if !self.settings.is_configured() {
            bail!(
                "WebDAV is not configured. Run `davdrop-cli config set webdavUrl <URL>` \
                 and `davdrop-cli config set username <NAME>` first."
            );
        }
        WebDAVClient::new(self.settings.webdav_url.clone(), self.settings.credentials())
            .context("Failed to create WebDAV client")
    }
}

use anyhow::{bail, Result};

use davdrop_lib::sync::PathMapping;

use crate::app::App;
use crate::OutputFormat;

pub fn run_show(app: &App, format: &OutputFormat) -> Result<()> {
    let settings = app.settings.redacted();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        OutputFormat::Plain => {
            println!("Settings file:      {}", app.store.path().display());
            println!("webdavUrl:          {}", settings.webdav_url);
            println!("username:           {}", settings.username);
            println!("password:           {}", settings.password);
            println!("rootFolder:         {}", settings.root_folder);
            println!("pathMode:           {:?}", settings.path_mode);
            println!("localSyncFolder:    {}", settings.local_sync_folder);
            println!("remoteSyncFolder:   {}", settings.remote_sync_folder);
            println!("preferExistingLink: {}", settings.prefer_existing_link);

            if settings.path_mappings.is_empty() {
                println!("\nNo path mappings.");
            } else {
                println!("\nPath mappings:");
                for mapping in &settings.path_mappings {
                    println!("  {} -> {}", mapping.local_path, mapping.remote_path);
                }
            }
        }
    }

    Ok(())
}

pub fn run_set(app: &mut App, key: &str, value: &str) -> Result<()> {
    app.settings.set(key, value)?;
    app.save()?;
    println!("Set {}", key);
    Ok(())
}

pub fn run_add_mapping(app: &mut App, local: &str, remote: &str) -> Result<()> {
    if local.is_empty() {
        bail!("Local path of a mapping cannot be empty");
    }
    app.settings.add_mapping(PathMapping::new(local, remote));
    app.save()?;
    println!("Mapped {} -> {}", local, remote);
    Ok(())
}

pub fn run_remove_mapping(app: &mut App, local: &str) -> Result<()> {
    if !app.settings.remove_mapping(local) {
        bail!("No mapping for '{}'", local);
    }
    app.save()?;
    println!("Removed mapping for {}", local);
    Ok(())
}

use anyhow::{Context, Result};

use davdrop_lib::sync::paths;

use crate::app::App;
use crate::OutputFormat;

pub async fn run_exists(app: &App, path: &str, format: &OutputFormat) -> Result<()> {
    let client = app.client()?;
    let path = paths::join_remote(&[path]);
    let exists = client.exists(&path).await;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path,
                "exists": exists,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if exists {
                println!("{} exists", path);
            } else {
                println!("{} not found", path);
            }
        }
    }

    Ok(())
}

pub async fn run_mkdir(app: &App, path: &str) -> Result<()> {
    let client = app.client()?;
    let path = paths::join_remote(&[path]);
    client
        .mkdir_p(&path)
        .await
        .with_context(|| format!("Failed to create {}", path))?;
    println!("Created {}", path);
    Ok(())
}

pub async fn run_test(app: &App) -> Result<()> {
    let client = app.client()?;
    client
        .test_connection()
        .await
        .with_context(|| format!("Could not connect to {}", client.base_url()))?;
    println!("Connected to {}", client.base_url());
    Ok(())
}

use anyhow::Result;

use davdrop_lib::sync::{resolve, resolve_destination, DropContext, Resolution};

use crate::app::App;
use crate::OutputFormat;

/// Preview a resolution. Without `probe` no network call is made.
pub async fn run(
    app: &App,
    file: &str,
    folder: &str,
    probe: bool,
    format: &OutputFormat,
) -> Result<()> {
    let ctx = DropContext {
        file_path: file,
        document_folder: folder,
    };

    let resolution = if probe {
        let client = app.client()?;
        resolve(&ctx, &app.settings, &client).await
    } else {
        Resolution::from(resolve_destination(&ctx, &app.settings))
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        OutputFormat::Plain => {
            println!("File:      {}", file);
            println!("Folder:    {}", folder);
            println!("Mode:      {:?}", app.settings.path_mode);
            match &resolution.remote_path {
                Some(path) => println!("Remote:    {}", path),
                None => println!("Remote:    (none)"),
            }
            println!("Decision:  {:?}", resolution.decision);
            if let Some(mapping) = &resolution.mapping {
                println!("Mapping:   {} -> {}", mapping.local_path, mapping.remote_path);
            }
            println!("Reason:    {}", resolution.reason);
            if !probe && app.settings.prefer_existing_link && resolution.remote_path.is_some() {
                println!("\nRun with --probe to check for an existing remote copy.");
            }
        }
    }

    Ok(())
}

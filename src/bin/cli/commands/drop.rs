use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use davdrop_lib::sync::{DropHandler, DropState, DroppedItem, LocalFile, MarkdownDocument};

use super::CliNotifier;
use crate::app::App;
use crate::OutputFormat;

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

/// Folder of the note relative to the vault, `/` for the vault root
fn note_folder(note: &Path, vault: &Path) -> String {
    let parent = note.parent().unwrap_or(Path::new(""));
    match parent.strip_prefix(vault) {
        Ok(rel) => {
            let rel = rel.to_string_lossy().replace('\\', "/");
            if rel.is_empty() {
                "/".to_string()
            } else {
                rel
            }
        }
        Err(_) => {
            log::warn!(
                "drop: note {} is outside vault {}, treating it as a root note",
                note.display(),
                vault.display()
            );
            "/".to_string()
        }
    }
}

pub async fn run(
    app: &App,
    files: &[PathBuf],
    note: &Path,
    vault: Option<&Path>,
    offset: Option<usize>,
    format: &OutputFormat,
) -> Result<()> {
    let client = app.client()?;

    let note = absolute(note)?;
    let vault = match vault {
        Some(v) => absolute(v)?,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let content = std::fs::read_to_string(&note)
        .with_context(|| format!("Failed to read note {}", note.display()))?;
    let mut document = MarkdownDocument::new(note_folder(&note, &vault), content, offset);

    let mut items: Vec<Box<dyn DroppedItem>> = Vec::with_capacity(files.len());
    for file in files {
        items.push(Box::new(LocalFile::new(absolute(file)?)));
    }

    let handler = DropHandler::with_notifier(client, CliNotifier);
    let report = handler.handle_drop(&app.settings, &items, &mut document).await?;

    // The note is only rewritten when at least one link went in
    if report.inserted() > 0 {
        std::fs::write(&note, document.content())
            .with_context(|| format!("Failed to write note {}", note.display()))?;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            for file in &report.files {
                match file.state {
                    DropState::Done => println!(
                        "{:<24} {:<10} {}",
                        file.name,
                        file.decision.map(|d| format!("{:?}", d)).unwrap_or_default(),
                        file.remote_path.as_deref().unwrap_or("(local)")
                    ),
                    _ => println!(
                        "{:<24} failed: {}",
                        file.name,
                        file.error.as_deref().unwrap_or("unknown error")
                    ),
                }
            }
            println!(
                "\n{} linked, {} failed",
                report.inserted(),
                report.failed()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_folder() {
        let vault = Path::new("/vault");
        assert_eq!(note_folder(Path::new("/vault/a.md"), vault), "/");
        assert_eq!(note_folder(Path::new("/vault/notes/sub/a.md"), vault), "notes/sub");
        assert_eq!(note_folder(Path::new("/elsewhere/a.md"), vault), "/");
    }
}

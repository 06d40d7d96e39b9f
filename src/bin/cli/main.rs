mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "davdrop-cli", about = "Upload files to WebDAV and link them from markdown notes", version)]
struct Cli {
    /// Settings file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Drop files into a note: upload them and insert links
    Drop {
        /// Files to drop, handled in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Markdown note receiving the links
        #[arg(long)]
        note: PathBuf,
        /// Vault root the note's folder is measured from (default: current dir)
        #[arg(long)]
        vault: Option<PathBuf>,
        /// Byte offset to insert at (default: end of note)
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Show where a file would be uploaded without uploading it
    Simulate {
        /// Local file path
        file: String,
        /// Folder of the active note, relative to the vault
        #[arg(long, default_value = "/")]
        folder: String,
        /// Also check whether the remote copy already exists
        #[arg(long)]
        probe: bool,
    },

    /// View or change settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Check whether a remote path exists
    Exists {
        /// Remote path
        path: String,
    },

    /// Create a remote directory and its parents
    Mkdir {
        /// Remote path
        path: String,
    },

    /// Test the connection to the WebDAV server
    Test,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print current settings
    Show,

    /// Set a single option (webdavUrl, username, password, rootFolder,
    /// localSyncFolder, remoteSyncFolder, pathMode, preferExistingLink)
    Set {
        key: String,
        value: String,
    },

    /// Add or replace a path mapping
    AddMapping {
        /// Local folder prefix
        local: String,
        /// Remote folder
        remote: String,
    },

    /// Remove the path mapping for a local folder
    RemoveMapping {
        local: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut app = app::App::new(cli.config)?;

    match cli.command {
        Command::Drop { files, note, vault, offset } => {
            commands::drop::run(&app, &files, &note, vault.as_deref(), offset, &cli.format).await?;
        }
        Command::Simulate { file, folder, probe } => {
            commands::simulate::run(&app, &file, &folder, probe, &cli.format).await?;
        }
        Command::Config(subcmd) => match subcmd {
            ConfigCommand::Show => commands::config::run_show(&app, &cli.format)?,
            ConfigCommand::Set { key, value } => commands::config::run_set(&mut app, &key, &value)?,
            ConfigCommand::AddMapping { local, remote } => {
                commands::config::run_add_mapping(&mut app, &local, &remote)?
            }
            ConfigCommand::RemoveMapping { local } => {
                commands::config::run_remove_mapping(&mut app, &local)?
            }
        },
        Command::Exists { path } => {
            commands::remote::run_exists(&app, &path, &cli.format).await?;
        }
        Command::Mkdir { path } => {
            commands::remote::run_mkdir(&app, &path).await?;
        }
        Command::Test => {
            commands::remote::run_test(&app).await?;
        }
    }

    Ok(())
}

//! Decides where a dropped file goes and whether it needs uploading.
//!
//! [`resolve_destination`] is pure and backs both the live drop handler and
//! the `simulate` preview. [`resolve`] adds the optional remote existence
//! probe on top.

use serde::Serialize;

use super::config::{PathMapping, PathMode, Settings, SyncFolderConfig};
use super::paths;
use super::webdav::RemoteStore;

/// What to do with one dropped file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    /// Upload, then link to the remote copy
    Upload,
    /// Remote copy already present; link without uploading
    LinkOnly,
    /// Keep the file local and link to it with a file URL
    LocalLink,
}

/// Inputs describing one drop
#[derive(Debug, Clone, Copy)]
pub struct DropContext<'a> {
    /// Absolute local path of the dropped file
    pub file_path: &'a str,
    /// Folder of the active document, `/` when there is none
    pub document_folder: &'a str,
}

/// Remote location computed without touching the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Remote {
        path: String,
        mapping: Option<PathMapping>,
        reason: String,
    },
    /// File lies outside the sync folder
    LocalOnly { reason: String },
    /// No mapping matched and there is no root folder to fall back to
    Unresolved { reason: String },
}

/// Outcome of resolving one dropped file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Absolute remote path, `None` for local links and unresolved drops
    pub remote_path: Option<String>,
    pub decision: Decision,
    pub reason: String,
    /// Mapping rule that produced the path, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<PathMapping>,
}

/// Compute the destination for a dropped file from settings alone
pub fn resolve_destination(ctx: &DropContext<'_>, settings: &Settings) -> Destination {
    if settings.path_mode == PathMode::Local {
        if let Some(sync) = settings.sync_folder() {
            return resolve_in_sync_folder(ctx.file_path, &sync);
        }
        return resolve_local_fallback(ctx.file_path, settings);
    }
    resolve_for_note(ctx, settings)
}

impl From<Destination> for Resolution {
    /// Resolution before any existence probe: remote destinations upload
    fn from(dest: Destination) -> Self {
        match dest {
            Destination::Remote { path, mapping, reason } => Self {
                remote_path: Some(path),
                decision: Decision::Upload,
                reason,
                mapping,
            },
            Destination::LocalOnly { reason } => Self {
                remote_path: None,
                decision: Decision::LocalLink,
                reason,
                mapping: None,
            },
            Destination::Unresolved { reason } => Self {
                remote_path: None,
                decision: Decision::Upload,
                reason,
                mapping: None,
            },
        }
    }
}

/// Resolve a drop, probing the remote store when `prefer_existing_link` is set
pub async fn resolve(
    ctx: &DropContext<'_>,
    settings: &Settings,
    probe: &dyn RemoteStore,
) -> Resolution {
    let mut resolution = Resolution::from(resolve_destination(ctx, settings));

    let already_uploaded = match &resolution.remote_path {
        Some(path) if settings.prefer_existing_link => probe.exists(path).await,
        _ => false,
    };
    if already_uploaded {
        resolution.decision = Decision::LinkOnly;
    }

    if let Some(path) = &resolution.remote_path {
        log::debug!("resolver: {} -> {} ({:?})", ctx.file_path, path, resolution.decision);
    }

    resolution
}

fn resolve_in_sync_folder(file_path: &str, sync: &SyncFolderConfig) -> Destination {
    let file = paths::normalize_local(file_path);
    let root = paths::normalize_local(&sync.local_sync_folder);

    match paths::strip_prefix_ignore_case(&file, &root) {
        Some(relative) => {
            let relative = relative.trim_start_matches('/');
            Destination::Remote {
                path: paths::join_remote(&[&sync.remote_sync_folder, relative]),
                mapping: None,
                reason: format!("inside sync folder {}", sync.local_sync_folder),
            }
        }
        None => Destination::LocalOnly {
            reason: format!("outside sync folder {}", sync.local_sync_folder),
        },
    }
}

/// Longest `local_path` among the mappings accepted by `matches`.
/// Blank rules are ignored.
fn best_mapping<'a>(
    mappings: &'a [PathMapping],
    matches: impl Fn(&PathMapping) -> bool,
) -> Option<&'a PathMapping> {
    mappings
        .iter()
        .filter(|m| !m.local_path.is_empty() && matches(m))
        .fold(None, |best: Option<&PathMapping>, m| match best {
            Some(b) if b.local_path.len() >= m.local_path.len() => Some(b),
            _ => Some(m),
        })
}

fn has_root_folder(settings: &Settings) -> bool {
    !settings.root_folder.trim().is_empty()
}

fn resolve_for_note(ctx: &DropContext<'_>, settings: &Settings) -> Destination {
    let folder = ctx.document_folder;
    let name = paths::file_name(ctx.file_path);

    // Note folders are compared raw, separators untouched
    if let Some(mapping) = best_mapping(&settings.path_mappings, |m| folder.starts_with(&m.local_path)) {
        let rest = &folder[mapping.local_path.len()..];
        return Destination::Remote {
            path: paths::join_remote(&[&mapping.remote_path, rest, name]),
            mapping: Some(mapping.clone()),
            reason: format!("note folder matches mapping {}", mapping.local_path),
        };
    }

    if !has_root_folder(settings) {
        return Destination::Unresolved {
            reason: "no mapping matches and no root folder is configured".to_string(),
        };
    }
    Destination::Remote {
        path: paths::join_remote(&[&settings.root_folder, folder, name]),
        mapping: None,
        reason: "no mapping matches, using root folder".to_string(),
    }
}

fn resolve_local_fallback(file_path: &str, settings: &Settings) -> Destination {
    let folder = paths::parent_folder(file_path);
    let name = paths::file_name(file_path);

    // Substring containment, unlike the prefix test used for notes
    if let Some(mapping) = best_mapping(&settings.path_mappings, |m| folder.contains(m.local_path.as_str())) {
        return Destination::Remote {
            path: paths::join_remote(&[&mapping.remote_path, name]),
            mapping: Some(mapping.clone()),
            reason: format!("file folder contains mapping {}", mapping.local_path),
        };
    }

    if !has_root_folder(settings) {
        return Destination::Unresolved {
            reason: "no mapping matches and no root folder is configured".to_string(),
        };
    }
    Destination::Remote {
        path: paths::join_remote(&[&settings.root_folder, name]),
        mapping: None,
        reason: "no mapping matches, using root folder".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::MemoryStore;

    fn note_settings(mappings: Vec<PathMapping>) -> Settings {
        Settings {
            root_folder: "/docs".to_string(),
            path_mappings: mappings,
            ..Settings::default()
        }
    }

    fn remote_path(dest: Destination) -> String {
        match dest {
            Destination::Remote { path, .. } => path,
            other => panic!("expected remote destination, got {:?}", other),
        }
    }

    #[test]
    fn test_longest_mapping_wins() {
        let settings = note_settings(vec![
            PathMapping::new("projects", "/short"),
            PathMapping::new("projects/rust", "/long"),
        ]);
        let ctx = DropContext {
            file_path: "/home/me/pic.png",
            document_folder: "projects/rust/notes",
        };

        match resolve_destination(&ctx, &settings) {
            Destination::Remote { path, mapping, .. } => {
                assert_eq!(path, "/long/notes/pic.png");
                assert_eq!(mapping.unwrap().local_path, "projects/rust");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_longest_mapping_wins_regardless_of_order() {
        let settings = note_settings(vec![
            PathMapping::new("projects/rust", "/long"),
            PathMapping::new("projects", "/short"),
        ]);
        let ctx = DropContext {
            file_path: "/home/me/pic.png",
            document_folder: "projects/rust",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/long/pic.png");
    }

    #[test]
    fn test_note_root_fallback_collapses_separators() {
        let settings = note_settings(vec![PathMapping::new("other", "/x")]);
        let ctx = DropContext {
            file_path: "/home/me/a.png",
            document_folder: "notes//sub",
        };
        assert_eq!(
            remote_path(resolve_destination(&ctx, &settings)),
            "/docs/notes/sub/a.png"
        );
    }

    #[test]
    fn test_note_at_vault_root() {
        let settings = note_settings(Vec::new());
        let ctx = DropContext {
            file_path: "C:\\Users\\me\\a.png",
            document_folder: "/",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/docs/a.png");
    }

    #[test]
    fn test_note_mapping_uses_raw_prefix() {
        // Backslash folder does not match a forward-slash rule
        let settings = note_settings(vec![PathMapping::new("a/b", "/mapped")]);
        let ctx = DropContext {
            file_path: "/x/y.png",
            document_folder: "a\\b",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/docs/a/b/y.png");
    }

    #[test]
    fn test_blank_mapping_is_ignored() {
        let settings = note_settings(vec![PathMapping::new("", "/catch-all")]);
        let ctx = DropContext {
            file_path: "/x/y.png",
            document_folder: "notes",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/docs/notes/y.png");
    }

    #[test]
    fn test_unresolved_without_root_folder() {
        let mut settings = note_settings(Vec::new());
        settings.root_folder = String::new();
        let ctx = DropContext {
            file_path: "/x/y.png",
            document_folder: "notes",
        };
        assert!(matches!(
            resolve_destination(&ctx, &settings),
            Destination::Unresolved { .. }
        ));
    }

    #[test]
    fn test_sync_folder_case_insensitive() {
        let settings = Settings {
            path_mode: PathMode::Local,
            local_sync_folder: "c:/users/me/sync".to_string(),
            remote_sync_folder: "/remote".to_string(),
            ..Settings::default()
        };
        let ctx = DropContext {
            file_path: "C:/Users/Me/Sync/img/a.png",
            document_folder: "/",
        };
        assert_eq!(
            remote_path(resolve_destination(&ctx, &settings)),
            "/remote/img/a.png"
        );
    }

    #[test]
    fn test_sync_folder_windows_separators_and_trailing_slash() {
        let settings = Settings {
            path_mode: PathMode::Local,
            local_sync_folder: "D:\\Sync\\".to_string(),
            remote_sync_folder: "sync/".to_string(),
            ..Settings::default()
        };
        let ctx = DropContext {
            file_path: "d:\\sync\\a.png",
            document_folder: "/",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/sync/a.png");
    }

    #[test]
    fn test_empty_remote_sync_folder_targets_endpoint_root() {
        let settings = Settings {
            path_mode: PathMode::Local,
            local_sync_folder: "/home/me/Sync".to_string(),
            root_folder: "/attachments".to_string(),
            ..Settings::default()
        };
        let ctx = DropContext {
            file_path: "/home/me/Sync/img/a.png",
            document_folder: "/",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/img/a.png");
    }

    #[test]
    fn test_outside_sync_folder_is_local_only() {
        let settings = Settings {
            path_mode: PathMode::Local,
            local_sync_folder: "/home/me/Sync".to_string(),
            remote_sync_folder: "/remote".to_string(),
            path_mappings: vec![PathMapping::new("home", "/mapped")],
            ..Settings::default()
        };
        let ctx = DropContext {
            file_path: "/home/me/Downloads/a.png",
            document_folder: "/",
        };
        assert!(matches!(
            resolve_destination(&ctx, &settings),
            Destination::LocalOnly { .. }
        ));
    }

    #[test]
    fn test_local_fallback_uses_containment() {
        let settings = Settings {
            path_mode: PathMode::Local,
            root_folder: "/root".to_string(),
            path_mappings: vec![
                PathMapping::new("Pictures", "/pics"),
                PathMapping::new("me/Pictures/2024", "/pics/2024"),
            ],
            ..Settings::default()
        };

        let ctx = DropContext {
            file_path: "/home/me/Pictures/2024/a.png",
            document_folder: "notes",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/pics/2024/a.png");

        let ctx = DropContext {
            file_path: "/mnt/Pictures/b.png",
            document_folder: "notes",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/pics/b.png");

        let ctx = DropContext {
            file_path: "/tmp/c.png",
            document_folder: "notes",
        };
        assert_eq!(remote_path(resolve_destination(&ctx, &settings)), "/root/c.png");
    }

    #[tokio::test]
    async fn test_prefer_existing_link() {
        let store = MemoryStore::new();
        store.insert_file("/docs/notes/a.png", b"old".to_vec());
        let settings = Settings {
            prefer_existing_link: true,
            ..note_settings(Vec::new())
        };

        let ctx = DropContext {
            file_path: "/home/a.png",
            document_folder: "notes",
        };
        let resolution = resolve(&ctx, &settings, &store).await;
        assert_eq!(resolution.decision, Decision::LinkOnly);
        assert_eq!(resolution.remote_path.as_deref(), Some("/docs/notes/a.png"));

        let ctx = DropContext {
            file_path: "/home/b.png",
            document_folder: "notes",
        };
        let resolution = resolve(&ctx, &settings, &store).await;
        assert_eq!(resolution.decision, Decision::Upload);
    }

    #[tokio::test]
    async fn test_no_probe_without_prefer_existing() {
        let store = MemoryStore::new();
        store.insert_file("/docs/a.png", Vec::new());
        let settings = note_settings(Vec::new());
        let ctx = DropContext {
            file_path: "/home/a.png",
            document_folder: "/",
        };

        let resolution = resolve(&ctx, &settings, &store).await;
        assert_eq!(resolution.decision, Decision::Upload);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_local_link_resolution_issues_no_calls() {
        let store = MemoryStore::new();
        let settings = Settings {
            path_mode: PathMode::Local,
            local_sync_folder: "/sync".to_string(),
            prefer_existing_link: true,
            ..Settings::default()
        };
        let ctx = DropContext {
            file_path: "/elsewhere/a.png",
            document_folder: "/",
        };

        let resolution = resolve(&ctx, &settings, &store).await;
        assert_eq!(resolution.decision, Decision::LocalLink);
        assert_eq!(resolution.remote_path, None);
        assert!(store.calls().is_empty());
    }
}

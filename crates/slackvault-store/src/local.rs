//! Directory-backed vault.
//!
//! Settings come from `<root>/.obsidian/app.json` (string values only) plus
//! overrides set by the caller. Trashed files either move into `<root>/.trash`
//! or go to the operating system trash.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use slackvault_config::{TrashMode, VaultConfig};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::path::normalize_path;
use crate::store::{FileHandle, FileStore};

const SETTINGS_DIR: &str = ".obsidian";
const SETTINGS_FILE: &str = "app.json";
const TRASH_DIR: &str = ".trash";

/// Vault rooted at a directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalVault {
    root: PathBuf,
    trash_mode: TrashMode,
    settings: HashMap<String, String>,
}

impl LocalVault {
    /// Open the vault at `root`, loading its settings file when present.
    ///
    /// # Errors
    ///
    /// Returns an error when the root is not a directory or the settings file
    /// cannot be read or parsed.
    pub async fn open(root: impl Into<PathBuf>, trash_mode: TrashMode) -> StoreResult<Self> {
        let root = root.into();
        let is_dir = fs::metadata(&root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(StoreError::RootUnavailable { root });
        }

        let settings = load_settings(&root).await?;
        debug!(
            root = %root.display(),
            settings = settings.len(),
            trash_mode = %trash_mode,
            "opened vault"
        );
        Ok(Self {
            root,
            trash_mode,
            settings,
        })
    }

    /// Open the vault described by the configuration, applying its attachment
    /// folder override under the configured settings key.
    ///
    /// # Errors
    ///
    /// See [`LocalVault::open`].
    pub async fn from_config(config: &VaultConfig) -> StoreResult<Self> {
        let vault = Self::open(config.root.clone(), config.trash_mode).await?;
        Ok(match &config.attachment_folder {
            Some(folder) => vault.with_setting(config.attachment_folder_key.clone(), folder.clone()),
            None => vault,
        })
    }

    /// Override a vault setting for this handle only.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Vault root on disk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, vault_path: &str) -> PathBuf {
        vault_path
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    async fn create_file(&self, raw_path: &str, bytes: &[u8]) -> StoreResult<FileHandle> {
        let path = normalize_path(raw_path)?;
        let absolute = self.absolute(&path);

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::io("folder.create", parent, source))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&absolute)
            .await
            .map_err(|source| {
                if source.kind() == io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists { path: path.clone() }
                } else {
                    StoreError::io("file.create", &absolute, source)
                }
            })?;
        file.write_all(bytes)
            .await
            .map_err(|source| StoreError::io("file.write", &absolute, source))?;
        file.flush()
            .await
            .map_err(|source| StoreError::io("file.flush", &absolute, source))?;

        debug!(path = %path, bytes = bytes.len(), "created vault file");
        Ok(FileHandle::new(path))
    }

    async fn move_to_local_trash(&self, handle: &FileHandle, absolute: &Path) -> StoreResult<()> {
        let trash_dir = self.root.join(TRASH_DIR);
        fs::create_dir_all(&trash_dir)
            .await
            .map_err(|source| StoreError::io("trash.prepare", &trash_dir, source))?;

        let destination = free_trash_slot(&trash_dir, handle.name()).await;
        fs::rename(absolute, &destination)
            .await
            .map_err(|source| StoreError::io("trash.move", absolute, source))?;
        info!(
            path = %handle.path,
            destination = %destination.display(),
            "moved file to vault trash"
        );
        Ok(())
    }
}

#[async_trait]
impl FileStore for LocalVault {
    async fn config_value(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.settings.get(key).cloned())
    }

    async fn create_text(&self, path: &str, content: &str) -> StoreResult<FileHandle> {
        self.create_file(path, content.as_bytes()).await
    }

    async fn create_binary(&self, path: &str, bytes: &[u8]) -> StoreResult<FileHandle> {
        self.create_file(path, bytes).await
    }

    async fn list_files(&self) -> StoreResult<Vec<FileHandle>> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || walk_files(&root))
            .await
            .map_err(|source| StoreError::Task {
                operation: "files.list",
                source,
            })?
    }

    async fn trash(&self, handle: &FileHandle) -> StoreResult<()> {
        let path = normalize_path(&handle.path)?;
        let absolute = self.absolute(&path);
        match fs::metadata(&absolute).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(StoreError::NotFound { path }),
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { path });
            }
            Err(source) => return Err(StoreError::io("trash.inspect", &absolute, source)),
        }

        match self.trash_mode {
            TrashMode::Local => self.move_to_local_trash(handle, &absolute).await,
            TrashMode::System => {
                let target = absolute.clone();
                tokio::task::spawn_blocking(move || trash::delete(&target))
                    .await
                    .map_err(|source| StoreError::Task {
                        operation: "trash.system",
                        source,
                    })?
                    .map_err(|source| StoreError::SystemTrash {
                        path: absolute,
                        source,
                    })?;
                info!(path = %handle.path, "moved file to system trash");
                Ok(())
            }
        }
    }
}

async fn load_settings(root: &Path) -> StoreResult<HashMap<String, String>> {
    let path = root.join(SETTINGS_DIR).join(SETTINGS_FILE);
    let raw = match fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(source) => return Err(StoreError::io("settings.read", &path, source)),
    };

    let value: Value =
        serde_json::from_str(&raw).map_err(|source| StoreError::Settings {
            path: path.clone(),
            source,
        })?;
    let Value::Object(entries) = value else {
        warn!(path = %path.display(), "vault settings are not an object; ignoring");
        return Ok(HashMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect())
}

fn walk_files(root: &Path) -> StoreResult<Vec<FileHandle>> {
    let mut handles = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !(entry.depth() == 1 && is_reserved(entry.file_name())));

    for entry in walker {
        let entry = entry.map_err(|source| StoreError::Walkdir {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        match vault_relative(relative) {
            Some(path) => handles.push(FileHandle::new(path)),
            None => warn!(path = %entry.path().display(), "skipping non UTF-8 vault path"),
        }
    }

    handles.sort();
    Ok(handles)
}

fn is_reserved(name: &std::ffi::OsStr) -> bool {
    name == SETTINGS_DIR || name == TRASH_DIR
}

fn vault_relative(relative: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            _ => return None,
        }
    }
    Some(segments.join("/"))
}

async fn free_trash_slot(trash_dir: &Path, name: &str) -> PathBuf {
    let candidate = trash_dir.join(name);
    if !exists(&candidate).await {
        return candidate;
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };
    let mut counter: u32 = 1;
    loop {
        let numbered = match extension {
            Some(extension) => format!("{stem} {counter}.{extension}"),
            None => format!("{stem} {counter}"),
        };
        let candidate = trash_dir.join(numbered);
        if !exists(&candidate).await {
            return candidate;
        }
        counter = counter.saturating_add(1);
    }
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn vault_relative_joins_segments_with_slashes() {
        let relative = Path::new("att").join("nested").join("msg1.json");
        assert_eq!(
            vault_relative(&relative).as_deref(),
            Some("att/nested/msg1.json")
        );
        assert_eq!(vault_relative(Path::new("../escape")), None);
    }

    #[test]
    fn reserved_folders_are_recognised() {
        assert!(is_reserved(OsStr::new(".obsidian")));
        assert!(is_reserved(OsStr::new(".trash")));
        assert!(!is_reserved(OsStr::new("att")));
    }
}

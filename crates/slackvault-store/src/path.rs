//! Vault-relative path normalisation.
//!
//! Vault paths are `/`-separated and relative to the vault root. Folders may be
//! empty (the root itself); file paths never are.

use crate::error::{StoreError, StoreResult};

/// Normalise a folder path. Empty, `.`, `/` and `./` all mean the vault root
/// and normalise to the empty string.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPath`] when a segment is `..`.
pub fn normalize_folder(raw: &str) -> StoreResult<String> {
    collapse(raw, raw.trim())
}

/// Normalise a file path. Segment text is kept exactly as given, surrounding
/// whitespace included.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPath`] when the path is blank or contains `..`.
pub fn normalize_path(raw: &str) -> StoreResult<String> {
    if raw.trim().is_empty() {
        return Err(StoreError::invalid_path(raw, "empty"));
    }
    let normalized = collapse(raw, raw)?;
    if normalized.is_empty() {
        return Err(StoreError::invalid_path(raw, "empty"));
    }
    Ok(normalized)
}

fn collapse(raw: &str, text: &str) -> StoreResult<String> {
    let mut segments = Vec::new();
    for segment in text.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(StoreError::invalid_path(raw, "parent_segment")),
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// Join a folder and a file name into a normalised vault path.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPath`] when either part is invalid or the name
/// is empty.
pub fn join(folder: &str, name: &str) -> StoreResult<String> {
    let folder = normalize_folder(folder)?;
    let name = normalize_path(name)?;
    if folder.is_empty() {
        Ok(name)
    } else {
        Ok(format!("{folder}/{name}"))
    }
}

/// Final segment of a vault path.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folders_collapse_to_root() -> StoreResult<()> {
        assert_eq!(normalize_folder("")?, "");
        assert_eq!(normalize_folder("/")?, "");
        assert_eq!(normalize_folder("./")?, "");
        assert_eq!(normalize_folder(" att/ ")?, "att");
        assert_eq!(normalize_folder("a//b\\c/")?, "a/b/c");
        Ok(())
    }

    #[test]
    fn parent_segments_are_rejected() {
        assert!(matches!(
            normalize_folder("att/../../etc"),
            Err(StoreError::InvalidPath {
                reason: "parent_segment",
                ..
            })
        ));
        assert!(join("att", "../msg1.json").is_err());
    }

    #[test]
    fn join_handles_root_and_nested_folders() -> StoreResult<()> {
        assert_eq!(join("att", "msg1.json")?, "att/msg1.json");
        assert_eq!(join("", "msg1.json")?, "msg1.json");
        assert_eq!(join("./files/", "/img.png")?, "files/img.png");
        assert!(matches!(
            join("att", ""),
            Err(StoreError::InvalidPath {
                reason: "empty",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn file_names_keep_their_exact_text() -> StoreResult<()> {
        assert_eq!(join(" att ", " msg1.json ")?, "att/ msg1.json ");
        assert!(matches!(
            normalize_path("   "),
            Err(StoreError::InvalidPath {
                reason: "empty",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn file_name_returns_last_segment() {
        assert_eq!(file_name("att/msg1.json"), "msg1.json");
        assert_eq!(file_name("msg1.json"), "msg1.json");
    }
}

//! Result payload fixtures and temporary vault helpers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

/// Create a fresh temporary directory with a recognisable prefix.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_vault() -> io::Result<TempDir> {
    tempfile::Builder::new().prefix("slackvault-").tempdir()
}

/// Write the vault settings file (`.obsidian/app.json`) with the given JSON.
///
/// # Errors
///
/// Returns an error if the settings folder or file cannot be written.
pub fn write_vault_settings(root: &Path, settings: &Value) -> io::Result<PathBuf> {
    let dir = root.join(".obsidian");
    fs::create_dir_all(&dir)?;
    let path = dir.join("app.json");
    fs::write(&path, settings.to_string())?;
    Ok(path)
}

/// Write a configuration document into `dir` and return its path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_config(dir: &Path, document: &Value) -> io::Result<PathBuf> {
    let path = dir.join("slackvault.json");
    fs::write(&path, document.to_string())?;
    Ok(path)
}

/// A message-and-thread payload shaped like a `conversations.replies` reply.
#[must_use]
pub fn sample_message_and_thread() -> Value {
    json!({
        "message": [
            {"type": "message", "user": "U01", "text": "hello", "ts": "1700000000.000100"}
        ],
        "thread": [
            {"type": "message", "user": "U01", "text": "hello", "ts": "1700000000.000100"},
            {"type": "message", "user": "U02", "text": "hi back", "ts": "1700000001.000200"}
        ]
    })
}

/// Structured result with no attachments.
#[must_use]
pub fn sample_result(file_name: &str) -> Value {
    json!({
        "message_and_thread": sample_message_and_thread(),
        "file_name": file_name,
        "users": {
            "U01": {"id": "U01", "name": "ada"},
            "U02": {"id": "U02", "name": "grace"}
        },
        "channel": {"id": "C024BE91L", "name": "general"}
    })
}

/// Structured result carrying remote attachment references.
#[must_use]
pub fn sample_result_with_refs(file_name: &str, refs: &[(&str, &str)]) -> Value {
    let mut value = sample_result(file_name);
    let entries: Map<String, Value> = refs
        .iter()
        .map(|(name, url)| ((*name).to_string(), Value::String((*url).to_string())))
        .collect();
    if let Value::Object(map) = &mut value {
        map.insert("attachment_refs".to_string(), Value::Object(entries));
    }
    value
}

/// Structured result carrying inline attachment payloads.
#[must_use]
pub fn sample_result_with_data(file_name: &str, data: Value) -> Value {
    let mut value = sample_result(file_name);
    if let Value::Object(map) = &mut value {
        map.insert("attachment_data".to_string(), data);
    }
    value
}

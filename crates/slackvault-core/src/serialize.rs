//! Primary record encoding.
//!
//! Only whitelisted fields are written: the message and thread payload,
//! participant, channel and team metadata when present, and the file name.
//! Attachment URLs, attachment bytes and unrecognised fields never reach disk.

use serde::Serialize;
use serde_json::Value;

use crate::error::SerializeResult;
use crate::model::{ConversationResult, FileName, OrderedMap};

#[derive(Serialize)]
struct PrimaryRecord<'a> {
    message_and_thread: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    users: Option<&'a OrderedMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    teams: Option<&'a OrderedMap<String, Value>>,
    file_name: &'a FileName,
}

/// Encode the primary record as two-space indented JSON ending in a newline.
///
/// # Errors
///
/// Returns a [`crate::SerializeError`] if JSON encoding fails.
pub fn serialize(result: &ConversationResult) -> SerializeResult<String> {
    let record = PrimaryRecord {
        message_and_thread: &result.message_and_thread,
        users: result.users.as_ref(),
        channel: result.channel.as_ref(),
        teams: result.teams.as_ref(),
        file_name: &result.file_name,
    };
    let mut text = serde_json::to_string_pretty(&record)?;
    text.push('\n');
    Ok(text)
}

//! Result data model.
//!
//! # Design
//! - A fetched result is a tagged variant: a failure string or a structured
//!   conversation. Classification happens once, at the boundary.
//! - Attachments are either remote references or inline payloads, never both.
//! - Map-like collections use [`OrderedMap`], which keeps document order and
//!   encodes itself as `{"kind": "map", "entries": [[k, v], ...]}`.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ResultError, ResultResult};

const MAP_KIND: &str = "map";

/// Insertion-ordered map with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> OrderedMap<K, V> {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value. An existing key keeps its position and gets the new
    /// value, which is returned in place of the old one.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Look up a value by key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Serialize, V: Serialize> Serialize for OrderedMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OrderedMap", 2)?;
        state.serialize_field("kind", MAP_KIND)?;
        state.serialize_field("entries", &self.entries)?;
        state.end()
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: DeserializeOwned + PartialEq,
    V: DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Object(object) = Value::deserialize(deserializer)? else {
            return Err(D::Error::custom("expected a JSON object for a map"));
        };

        let mut map = Self::new();
        if is_canonical(&object) {
            let entries = object.get("entries").cloned().unwrap_or(Value::Null);
            let pairs: Vec<(K, V)> = serde_json::from_value(entries).map_err(D::Error::custom)?;
            for (key, value) in pairs {
                if map.insert(key, value).is_some() {
                    return Err(D::Error::custom("duplicate key in map entries"));
                }
            }
            return Ok(map);
        }

        for (key, value) in object {
            let key: K = serde_json::from_value(Value::String(key)).map_err(D::Error::custom)?;
            let value: V = serde_json::from_value(value).map_err(D::Error::custom)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

fn is_canonical(object: &Map<String, Value>) -> bool {
    object.len() == 2
        && object.get("kind").and_then(Value::as_str) == Some(MAP_KIND)
        && object.get("entries").is_some_and(Value::is_array)
}

/// Non-empty base name of the primary record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileName(pub(crate) String);

impl FileName {
    /// Validate and wrap a file name. The name is kept exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`ResultError::MissingFileName`] when the name is blank.
    pub fn new(raw: impl Into<String>) -> ResultResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ResultError::MissingFileName);
        }
        Ok(Self(raw))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attachment content delivered with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineAttachment {
    /// Text written as-is.
    Text(String),
    /// Raw bytes.
    Binary(Vec<u8>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInline {
    Text(String),
    Encoded { base64: String },
    Bytes(Vec<u8>),
}

impl<'de> Deserialize<'de> for InlineAttachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawInline::deserialize(deserializer)? {
            RawInline::Text(text) => Ok(Self::Text(text)),
            RawInline::Encoded { base64 } => STANDARD
                .decode(base64.trim())
                .map(Self::Binary)
                .map_err(D::Error::custom),
            RawInline::Bytes(bytes) => Ok(Self::Binary(bytes)),
        }
    }
}

/// Where a result's attachments come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttachmentSource {
    /// No attachments.
    #[default]
    None,
    /// Attachment name to download URL.
    Remote(OrderedMap<String, String>),
    /// Attachment name to content already in hand.
    Inline(OrderedMap<String, InlineAttachment>),
}

impl AttachmentSource {
    /// Number of attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Remote(refs) => refs.len(),
            Self::Inline(items) => items.len(),
        }
    }

    /// Attachment names in write order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::Remote(refs) => refs.keys().map(String::as_str).collect(),
            Self::Inline(items) => items.keys().map(String::as_str).collect(),
        }
    }

    /// Whether there is nothing to write besides the primary record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A successfully fetched conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationResult {
    /// Message and thread payload, opaque to the pipeline.
    pub message_and_thread: Value,
    /// Participants keyed by user id.
    pub users: Option<OrderedMap<String, Value>>,
    /// Channel metadata.
    pub channel: Option<Value>,
    /// Teams keyed by team id.
    pub teams: Option<OrderedMap<String, Value>>,
    /// Base name of the primary record.
    pub file_name: FileName,
    /// Attachments to persist next to the primary record.
    pub attachments: AttachmentSource,
    /// Unrecognised top-level fields. Never persisted.
    pub extra: Map<String, Value>,
}

impl ConversationResult {
    /// Minimal result with only a payload and a file name.
    #[must_use]
    pub fn new(message_and_thread: Value, file_name: FileName) -> Self {
        Self {
            message_and_thread,
            users: None,
            channel: None,
            teams: None,
            file_name,
            attachments: AttachmentSource::None,
            extra: Map::new(),
        }
    }

    /// Decode a structured result from its JSON object.
    ///
    /// # Errors
    ///
    /// Returns a [`ResultError`] when the file name is missing or blank, a
    /// reserved field has the wrong shape, or both attachment forms are set.
    pub fn from_object(mut object: Map<String, Value>) -> ResultResult<Self> {
        let file_name = match object.remove("file_name") {
            None | Some(Value::Null) => return Err(ResultError::MissingFileName),
            Some(Value::String(name)) => FileName::new(name)?,
            Some(_) => {
                return Err(ResultError::InvalidField {
                    field: "file_name",
                    reason: "expected_string",
                });
            }
        };

        let message_and_thread = object.remove("message_and_thread").unwrap_or(Value::Null);
        let users = decode_optional(&mut object, "users")?;
        let channel = object.remove("channel").filter(|value| !value.is_null());
        let teams = decode_optional(&mut object, "teams")?;

        let refs: Option<OrderedMap<String, String>> =
            decode_optional(&mut object, "attachment_refs")?;
        let data: Option<OrderedMap<String, InlineAttachment>> =
            decode_optional(&mut object, "attachment_data")?;
        let attachments = match (refs, data) {
            (Some(_), Some(_)) => return Err(ResultError::ConflictingAttachments),
            (Some(refs), None) => AttachmentSource::Remote(refs),
            (None, Some(data)) => AttachmentSource::Inline(data),
            (None, None) => AttachmentSource::None,
        };

        Ok(Self {
            message_and_thread,
            users,
            channel,
            teams,
            file_name,
            attachments,
            extra: object,
        })
    }
}

fn decode_optional<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    field: &'static str,
) -> ResultResult<Option<T>> {
    match object.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| ResultError::Decode { field, source }),
    }
}

/// Output of the external conversation fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedResult {
    /// The fetch failed with this message.
    Failure(String),
    /// The fetch produced a conversation.
    Structured(Box<ConversationResult>),
}

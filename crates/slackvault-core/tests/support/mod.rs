#![allow(dead_code)]

//! In-memory collaborators that journal every call in order.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use slackvault_core::{
    AttachmentRequest, FetchError, FetchResult, NotifyError, Notifier, Persister, Transport,
};
use slackvault_store::{FileHandle, FileStore, StoreError, StoreResult};

pub const COOKIE: &str = "xoxd-test-cookie";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ConfigValue(String),
    CreateText { path: String, content: String },
    CreateBinary { path: String, bytes: Vec<u8> },
    ListFiles,
    Trash(String),
    Fetch(AttachmentRequest),
    Clipboard(String),
    Success(String),
    Alert(String),
}

impl Event {
    pub const fn is_store_write(&self) -> bool {
        matches!(self, Self::CreateText { .. } | Self::CreateBinary { .. })
    }

    pub const fn is_store_call(&self) -> bool {
        matches!(
            self,
            Self::ConfigValue(_)
                | Self::CreateText { .. }
                | Self::CreateBinary { .. }
                | Self::ListFiles
                | Self::Trash(_)
        )
    }
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    fn push(&self, event: Event) {
        lock(&self.0).push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        lock(&self.0).clone()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        lock(&self.0).iter().filter(|event| predicate(event)).count()
    }

    pub fn position(&self, predicate: impl Fn(&Event) -> bool) -> Option<usize> {
        lock(&self.0).iter().position(predicate)
    }

    pub fn rposition(&self, predicate: impl Fn(&Event) -> bool) -> Option<usize> {
        lock(&self.0).iter().rposition(predicate)
    }
}

pub struct MemoryStore {
    journal: Journal,
    settings: Mutex<HashMap<String, String>>,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    failing: Mutex<BTreeSet<String>>,
    hidden: Mutex<bool>,
    fold_case: Mutex<bool>,
}

impl MemoryStore {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            settings: Mutex::new(HashMap::new()),
            files: Mutex::new(BTreeMap::new()),
            failing: Mutex::new(BTreeSet::new()),
            hidden: Mutex::new(false),
            fold_case: Mutex::new(false),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) {
        lock(&self.settings).insert(key.to_string(), value.to_string());
    }

    pub fn seed(&self, path: &str, bytes: &[u8]) {
        lock(&self.files).insert(path.to_string(), bytes.to_vec());
    }

    /// Every create at `path` fails with an IO error.
    pub fn fail_writes_to(&self, path: &str) {
        lock(&self.failing).insert(path.to_string());
    }

    /// `list_files` reports an empty vault.
    pub fn hide_listing(&self) {
        *lock(&self.hidden) = true;
    }

    /// Paths collide regardless of ASCII case, like a case-insensitive disk.
    pub fn fold_case(&self) {
        *lock(&self.fold_case) = true;
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.files).get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        lock(&self.files).keys().cloned().collect()
    }

    fn create(&self, path: &str, bytes: &[u8]) -> StoreResult<FileHandle> {
        if lock(&self.failing).contains(path) {
            return Err(StoreError::Io {
                operation: "file.create",
                path: path.into(),
                source: std::io::Error::other("disk full"),
            });
        }
        let fold_case = *lock(&self.fold_case);
        let mut files = lock(&self.files);
        if files
            .keys()
            .any(|existing| existing == path || (fold_case && existing.eq_ignore_ascii_case(path)))
        {
            return Err(StoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        files.insert(path.to_string(), bytes.to_vec());
        Ok(FileHandle::new(path))
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn config_value(&self, key: &str) -> StoreResult<Option<String>> {
        self.journal.push(Event::ConfigValue(key.to_string()));
        Ok(lock(&self.settings).get(key).cloned())
    }

    async fn create_text(&self, path: &str, content: &str) -> StoreResult<FileHandle> {
        self.journal.push(Event::CreateText {
            path: path.to_string(),
            content: content.to_string(),
        });
        self.create(path, content.as_bytes())
    }

    async fn create_binary(&self, path: &str, bytes: &[u8]) -> StoreResult<FileHandle> {
        self.journal.push(Event::CreateBinary {
            path: path.to_string(),
            bytes: bytes.to_vec(),
        });
        self.create(path, bytes)
    }

    async fn list_files(&self) -> StoreResult<Vec<FileHandle>> {
        self.journal.push(Event::ListFiles);
        if *lock(&self.hidden) {
            return Ok(Vec::new());
        }
        Ok(lock(&self.files).keys().map(FileHandle::new).collect())
    }

    async fn trash(&self, handle: &FileHandle) -> StoreResult<()> {
        self.journal.push(Event::Trash(handle.path.clone()));
        lock(&self.files)
            .remove(&handle.path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                path: handle.path.clone(),
            })
    }
}

pub struct ScriptedTransport {
    journal: Journal,
    responses: Mutex<HashMap<String, Result<Vec<u8>, u16>>>,
}

impl ScriptedTransport {
    pub fn respond(&self, url: &str, bytes: &[u8]) {
        lock(&self.responses).insert(url.to_string(), Ok(bytes.to_vec()));
    }

    pub fn reject(&self, url: &str, status: u16) {
        lock(&self.responses).insert(url.to_string(), Err(status));
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &AttachmentRequest) -> FetchResult<Vec<u8>> {
        self.journal.push(Event::Fetch(request.clone()));
        match lock(&self.responses).get(&request.url) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: request.url.clone(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: request.url.clone(),
                status: 404,
            }),
        }
    }
}

pub struct RecordingNotifier {
    journal: Journal,
    clipboard_broken: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            clipboard_broken: Mutex::new(false),
        }
    }

    pub fn break_clipboard(&self) {
        *lock(&self.clipboard_broken) = true;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn copy_to_clipboard(&self, text: &str) -> Result<(), NotifyError> {
        if *lock(&self.clipboard_broken) {
            return Err(NotifyError::ClipboardUnavailable {
                reason: "no_display",
            });
        }
        self.journal.push(Event::Clipboard(text.to_string()));
        Ok(())
    }

    async fn notify_success(&self, message: &str) {
        self.journal.push(Event::Success(message.to_string()));
    }

    async fn alert(&self, message: &str) {
        self.journal.push(Event::Alert(message.to_string()));
    }
}

pub struct Harness {
    pub journal: Journal,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<ScriptedTransport>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            store: Arc::new(MemoryStore::new(journal.clone())),
            transport: Arc::new(ScriptedTransport {
                journal: journal.clone(),
                responses: Mutex::new(HashMap::new()),
            }),
            notifier: Arc::new(RecordingNotifier::new(journal.clone())),
            journal,
        }
    }

    pub fn persister(&self) -> Persister {
        Persister::new(
            self.store.clone(),
            self.transport.clone(),
            self.notifier.clone(),
        )
    }

    pub fn alerts(&self) -> Vec<String> {
        self.journal
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn clipboard_writes(&self) -> Vec<String> {
        self.journal
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Clipboard(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn successes(&self) -> usize {
        self.journal
            .count(|event| matches!(event, Event::Success(_)))
    }
}

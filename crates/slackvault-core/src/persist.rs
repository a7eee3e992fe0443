//! Persistence pipeline for fetched conversations.
//!
//! # Design
//! - One run walks `Start -> Classified -> PrimaryWritten -> AttachmentsWritten
//!   -> Done`, recording each step with a status and timestamp.
//! - Collisions are resolved by trashing the existing file and creating it
//!   again, once. Every other store failure ends the run.
//! - The first attachment failure stops the remaining attachments. Files that
//!   were already written stay on disk and the run is reported as failed.
//! - Runs on one `Persister` are serialised so collision checks never
//!   interleave.
//! - The caller always gets a report; failures become a single alert.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use slackvault_store::path::{join, normalize_folder};
use slackvault_store::{FileHandle, FileStore, StoreResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::error::{PersistError, PersistResult, ResultResult};
use crate::fetch::{AttachmentFetcher, Transport};
use crate::model::{AttachmentSource, ConversationResult, FetchedResult, FileName, InlineAttachment};
use crate::notify::Notifier;
use crate::serialize::serialize;

/// Vault setting consulted for the attachment folder unless overridden.
pub const DEFAULT_ATTACHMENT_FOLDER_KEY: &str = "attachmentFolderPath";

/// Progress of a persistence run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistState {
    /// Nothing has happened yet.
    Start,
    /// The input was accepted as a structured result.
    Classified,
    /// The primary record is on disk.
    PrimaryWritten,
    /// Every attachment is on disk.
    AttachmentsWritten,
    /// The run succeeded and the user was notified.
    Done,
}

impl PersistState {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Classified => "classified",
            Self::PrimaryWritten => "primary_written",
            Self::AttachmentsWritten => "attachments_written",
            Self::Done => "done",
        }
    }
}

/// Pipeline steps recorded in a [`PersistReport`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Accept or reject the fetched result.
    Classify,
    /// Read the attachment folder from the vault settings.
    ResolveRoot,
    /// Serialize and write the primary record.
    WritePrimary,
    /// Obtain and write one attachment.
    WriteAttachment,
    /// Update the clipboard before the success notification.
    Notify,
}

impl StepKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::ResolveRoot => "resolve_root",
            Self::WritePrimary => "write_primary",
            Self::WriteAttachment => "write_attachment",
            Self::Notify => "notify",
        }
    }
}

/// Status of a recorded step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step began.
    Started,
    /// The step finished successfully.
    Completed,
    /// The step failed and ended the run.
    Failed,
}

impl StepStatus {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Latest status of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Step kind.
    pub step: StepKind,
    /// File name or attachment name the step worked on.
    pub subject: Option<String>,
    /// Latest status.
    pub status: StepStatus,
    /// Failure detail.
    pub detail: Option<String>,
    /// Time of the latest status change.
    pub updated_at: DateTime<Utc>,
}

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistOutcome {
    /// Everything was written and the file name is on the clipboard.
    Success {
        /// Primary record name.
        file_name: String,
    },
    /// The run stopped; `message` is what the user was shown.
    Failure {
        /// Alert text.
        message: String,
    },
}

/// Everything a caller needs to know about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct PersistReport {
    /// Final outcome.
    pub outcome: PersistOutcome,
    /// Furthest state reached. `Done` only on success.
    pub state: PersistState,
    /// Step history in execution order.
    pub steps: Vec<StepRecord>,
    /// Vault paths created during the run.
    pub files_written: Vec<String>,
    /// Run start.
    pub started_at: DateTime<Utc>,
    /// Run end.
    pub finished_at: DateTime<Utc>,
}

impl PersistReport {
    /// Whether the run succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, PersistOutcome::Success { .. })
    }

    /// Whether the run failed after writing at least one file.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.is_success() && !self.files_written.is_empty()
    }

    /// Latest status for a step, matched on subject when one is given.
    #[must_use]
    pub fn step_status(&self, step: StepKind, subject: Option<&str>) -> Option<StepStatus> {
        self.steps
            .iter()
            .find(|record| {
                record.step == step && (subject.is_none() || record.subject.as_deref() == subject)
            })
            .map(|record| record.status)
    }
}

struct RunLog {
    state: PersistState,
    steps: Vec<StepRecord>,
    files_written: Vec<String>,
    started_at: DateTime<Utc>,
}

impl RunLog {
    fn new() -> Self {
        Self {
            state: PersistState::Start,
            steps: Vec::new(),
            files_written: Vec::new(),
            started_at: Utc::now(),
        }
    }

    fn advance(&mut self, next: PersistState) {
        debug!(
            from = self.state.as_str(),
            to = next.as_str(),
            "persist state transition"
        );
        self.state = next;
    }

    fn wrote(&mut self, handle: FileHandle) {
        self.files_written.push(handle.path);
    }

    fn record(
        &mut self,
        step: StepKind,
        subject: Option<&str>,
        status: StepStatus,
        detail: Option<String>,
    ) {
        let now = Utc::now();
        match status {
            StepStatus::Started => debug!(step = step.as_str(), subject, "step started"),
            StepStatus::Completed => debug!(step = step.as_str(), subject, "step completed"),
            StepStatus::Failed => warn!(
                step = step.as_str(),
                subject,
                detail = detail.as_deref(),
                "step failed"
            ),
        }

        if let Some(record) = self
            .steps
            .iter_mut()
            .find(|record| record.step == step && record.subject.as_deref() == subject)
        {
            record.status = status;
            record.detail = detail;
            record.updated_at = now;
        } else {
            self.steps.push(StepRecord {
                step,
                subject: subject.map(str::to_string),
                status,
                detail,
                updated_at: now,
            });
        }
    }

    fn into_report(self, outcome: PersistOutcome) -> PersistReport {
        PersistReport {
            outcome,
            state: self.state,
            steps: self.steps,
            files_written: self.files_written,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

async fn execute_step<T, F>(
    log: &mut RunLog,
    step: StepKind,
    subject: Option<&str>,
    op: F,
) -> PersistResult<T>
where
    F: Future<Output = PersistResult<T>>,
{
    log.record(step, subject, StepStatus::Started, None);
    match op.await {
        Ok(value) => {
            log.record(step, subject, StepStatus::Completed, None);
            Ok(value)
        }
        Err(err) => {
            log.record(step, subject, StepStatus::Failed, Some(err.detail()));
            Err(err)
        }
    }
}

#[derive(Clone, Copy)]
enum Payload<'a> {
    Text(&'a str),
    Binary(&'a [u8]),
}

impl<'a> From<&'a InlineAttachment> for Payload<'a> {
    fn from(attachment: &'a InlineAttachment) -> Self {
        match attachment {
            InlineAttachment::Text(text) => Self::Text(text),
            InlineAttachment::Binary(bytes) => Self::Binary(bytes),
        }
    }
}

/// Writes fetched conversations and their attachments into a vault.
pub struct Persister {
    store: Arc<dyn FileStore>,
    fetcher: AttachmentFetcher,
    notifier: Arc<dyn Notifier>,
    attachment_folder_key: String,
    gate: Mutex<()>,
}

impl Persister {
    /// Assemble a pipeline from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn FileStore>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            fetcher: AttachmentFetcher::new(transport),
            notifier,
            attachment_folder_key: DEFAULT_ATTACHMENT_FOLDER_KEY.to_string(),
            gate: Mutex::new(()),
        }
    }

    /// Read the attachment folder from a different vault setting.
    #[must_use]
    pub fn with_attachment_folder_key(mut self, key: impl Into<String>) -> Self {
        self.attachment_folder_key = key.into();
        self
    }

    /// Persist an already classified result and notify the user.
    pub async fn process(&self, auth_cookie: &str, result: FetchedResult) -> PersistReport {
        self.run(auth_cookie, Ok(result)).await
    }

    /// Classify raw fetch output, then persist it. Values that fail
    /// classification are reported through the alert path.
    pub async fn process_json(&self, auth_cookie: &str, value: Value) -> PersistReport {
        self.run(auth_cookie, classify(value)).await
    }

    async fn run(&self, auth_cookie: &str, input: ResultResult<FetchedResult>) -> PersistReport {
        let _gate = self.gate.lock().await;
        let mut log = RunLog::new();

        let outcome = match self.persist(&mut log, auth_cookie, input).await {
            Ok(file_name) => self.announce(&mut log, &file_name).await,
            Err(err) => self.fail(&err).await,
        };

        let report = log.into_report(outcome);
        info!(
            success = report.is_success(),
            state = report.state.as_str(),
            files = report.files_written.len(),
            "persistence run finished"
        );
        report
    }

    async fn persist(
        &self,
        log: &mut RunLog,
        auth_cookie: &str,
        input: ResultResult<FetchedResult>,
    ) -> PersistResult<FileName> {
        let result = execute_step(log, StepKind::Classify, None, async {
            match input? {
                FetchedResult::Failure(message) => Err(PersistError::Fetch { message }),
                FetchedResult::Structured(result) => Ok(*result),
            }
        })
        .await?;
        log.advance(PersistState::Classified);

        let root = execute_step(log, StepKind::ResolveRoot, None, self.attachment_root()).await?;

        let file_name = result.file_name.as_str();
        let handle = execute_step(log, StepKind::WritePrimary, Some(file_name), async {
            let path = vault_path(&root, file_name)?;
            reject_shadowing(&root, &path, &result.attachments)?;
            let text = serialize(&result)?;
            self.create_replacing(&path, Payload::Text(&text)).await
        })
        .await?;
        log.wrote(handle);
        log.advance(PersistState::PrimaryWritten);

        self.write_attachments(log, &root, &result, auth_cookie).await?;
        log.advance(PersistState::AttachmentsWritten);

        Ok(result.file_name)
    }

    async fn attachment_root(&self) -> PersistResult<String> {
        let key = self.attachment_folder_key.as_str();
        let configured = self
            .store
            .config_value(key)
            .await
            .map_err(|source| PersistError::storage("config.read", key, source))?;
        let root = normalize_folder(configured.as_deref().unwrap_or_default())
            .map_err(|source| PersistError::storage("config.attachment_folder", key, source))?;
        debug!(key, root = %root, "resolved attachment folder");
        Ok(root)
    }

    async fn write_attachments(
        &self,
        log: &mut RunLog,
        root: &str,
        result: &ConversationResult,
        auth_cookie: &str,
    ) -> PersistResult<()> {
        match &result.attachments {
            AttachmentSource::None => {}
            AttachmentSource::Remote(refs) => {
                for (name, url) in refs.iter() {
                    let handle =
                        execute_step(log, StepKind::WriteAttachment, Some(name.as_str()), async {
                            let path = vault_path(root, name)?;
                            let bytes = self.fetcher.fetch(url, auth_cookie).await.map_err(
                                |source| PersistError::Attachment {
                                    name: name.clone(),
                                    source,
                                },
                            )?;
                            self.create_replacing(&path, Payload::Binary(&bytes)).await
                        })
                        .await?;
                    log.wrote(handle);
                }
            }
            AttachmentSource::Inline(items) => {
                for (name, item) in items.iter() {
                    let handle =
                        execute_step(log, StepKind::WriteAttachment, Some(name.as_str()), async {
                            let path = vault_path(root, name)?;
                            self.create_replacing(&path, Payload::from(item)).await
                        })
                        .await?;
                    log.wrote(handle);
                }
            }
        }
        Ok(())
    }

    async fn create_replacing(&self, path: &str, payload: Payload<'_>) -> PersistResult<FileHandle> {
        match self.create(path, payload).await {
            Ok(handle) => Ok(handle),
            Err(err) if err.is_already_exists() => {
                let existing = self.locate_existing(path).await?;
                self.store
                    .trash(&existing)
                    .await
                    .map_err(|source| PersistError::storage("file.trash", &existing.path, source))?;
                info!(path, trashed = %existing.path, "trashed existing file before recreating it");
                self.create(path, payload)
                    .await
                    .map_err(|source| PersistError::storage("file.recreate", path, source))
            }
            Err(source) => Err(PersistError::storage("file.create", path, source)),
        }
    }

    async fn create(&self, path: &str, payload: Payload<'_>) -> StoreResult<FileHandle> {
        match payload {
            Payload::Text(text) => self.store.create_text(path, text).await,
            Payload::Binary(bytes) => self.store.create_binary(path, bytes).await,
        }
    }

    async fn locate_existing(&self, path: &str) -> PersistResult<FileHandle> {
        let files = self
            .store
            .list_files()
            .await
            .map_err(|source| PersistError::storage("files.list", path, source))?;
        files
            .iter()
            .find(|handle| handle.path == path)
            .or_else(|| {
                files
                    .iter()
                    .find(|handle| handle.path.eq_ignore_ascii_case(path))
            })
            .cloned()
            .ok_or_else(|| PersistError::CollisionUnresolved {
                path: path.to_string(),
            })
    }

    async fn announce(&self, log: &mut RunLog, file_name: &FileName) -> PersistOutcome {
        let copied = execute_step(log, StepKind::Notify, Some(file_name.as_str()), async {
            self.notifier
                .copy_to_clipboard(file_name.as_str())
                .await
                .map_err(|source| PersistError::Clipboard { source })
        })
        .await;

        match copied {
            Ok(()) => {
                self.notifier
                    .notify_success(&format!("Saved {file_name}; name copied to clipboard"))
                    .await;
                log.advance(PersistState::Done);
                PersistOutcome::Success {
                    file_name: file_name.to_string(),
                }
            }
            Err(err) => self.fail(&err).await,
        }
    }

    async fn fail(&self, err: &PersistError) -> PersistOutcome {
        let message = err.detail();
        warn!(error = %err, detail = %message, "persistence run failed");
        self.notifier.alert(&message).await;
        PersistOutcome::Failure { message }
    }
}

fn vault_path(root: &str, name: &str) -> PersistResult<String> {
    join(root, name).map_err(|source| PersistError::storage("path.join", name, source))
}

/// Attachments that resolve onto the primary record path would trash it
/// through the collision policy, so the run stops before anything is written.
fn reject_shadowing(
    root: &str,
    primary: &str,
    attachments: &AttachmentSource,
) -> PersistResult<()> {
    let shadowing = attachments.names().into_iter().find(|name| {
        join(root, name).is_ok_and(|path| path.eq_ignore_ascii_case(primary))
    });
    match shadowing {
        Some(name) => {
            warn!(
                attachment = name,
                path = primary,
                "attachment collides with the record file"
            );
            Err(PersistError::AttachmentShadowsRecord {
                name: name.to_string(),
                path: primary.to_string(),
            })
        }
        None => Ok(()),
    }
}

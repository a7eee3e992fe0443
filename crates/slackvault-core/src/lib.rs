#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unreachable_pub, clippy::all, clippy::pedantic, clippy::nursery)]

//! Persistence pipeline for fetched Slack conversations.
//!
//! Layout: `model.rs` (result variants and ordered maps), `classify.rs`,
//! `serialize.rs` (primary record encoding), `fetch.rs` (attachment
//! downloads), `notify.rs` (user feedback seam), `persist.rs` (the pipeline),
//! `slack_url.rs` (permalink to file name), `error.rs`.

pub mod classify;
pub mod error;
pub mod fetch;
pub mod model;
pub mod notify;
pub mod persist;
pub mod serialize;
pub mod slack_url;

pub use classify::classify;
pub use error::{
    FetchError, FetchResult, NotifyError, PersistError, PersistResult, ResultError, ResultResult,
    SerializeError, SerializeResult, SlackUrlError, SlackUrlResult,
};
pub use fetch::{AttachmentFetcher, AttachmentRequest, HttpTransport, Transport};
pub use model::{
    AttachmentSource, ConversationResult, FetchedResult, FileName, InlineAttachment, OrderedMap,
};
pub use notify::Notifier;
pub use persist::{
    DEFAULT_ATTACHMENT_FOLDER_KEY, PersistOutcome, PersistReport, PersistState, Persister,
    StepKind, StepRecord, StepStatus,
};
pub use serialize::serialize;
pub use slack_url::SlackUrl;

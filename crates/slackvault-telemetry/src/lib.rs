#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unreachable_pub, clippy::all, clippy::pedantic, clippy::nursery)]

//! Telemetry primitives shared across the slackvault workspace.
//!
//! Layout: `init.rs` (subscriber installation and log formats), `context.rs`
//! (task-local run identifiers).

pub mod context;
pub mod init;

pub use context::{current_command, current_run_id, with_run_context};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_config,
};

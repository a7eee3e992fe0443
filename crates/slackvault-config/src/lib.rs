#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unreachable_pub, clippy::all, clippy::pedantic, clippy::nursery)]

//! File-backed configuration for slackvault.
//!
//! Layout: `model.rs` (typed documents and the effective config), `loader.rs`
//! (read, merge, resolve), `validate.rs` (field checks), `defaults.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, parse_document, resolve};
pub use model::{
    AppConfig, ConfigDocument, ConfigOverrides, HttpConfig, TelemetryConfig, TrashMode,
    VaultConfig,
};

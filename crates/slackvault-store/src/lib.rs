#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unreachable_pub, clippy::all, clippy::pedantic, clippy::nursery)]

//! Vault file-store adapter.
//!
//! Layout: `store.rs` (the `FileStore` seam and file handles), `local.rs`
//! (directory-backed vault), `path.rs` (vault path normalisation), `error.rs`.

pub mod error;
pub mod local;
pub mod path;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use local::LocalVault;
pub use store::{FileHandle, FileStore};

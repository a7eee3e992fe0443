#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_docs)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (result payloads, temporary vaults, config files).

pub mod fixtures;

//! Command handlers grouped by concern.

pub(crate) mod config;
pub(crate) mod name;
pub(crate) mod save;

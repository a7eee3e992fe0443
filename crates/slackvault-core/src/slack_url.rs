//! Message permalink parsing and canonical file names.
//!
//! A permalink looks like
//! `https://<team>.slack.com/archives/<channel>/p<ts>?thread_ts=<ts>`. The
//! timestamp segment drops its `p` prefix and gains a `.` after ten digits.

use std::collections::BTreeSet;

use url::Url;

use crate::error::{SlackUrlError, SlackUrlResult};
use crate::model::FileName;

const THREAD_TS_KEY: &str = "thread_ts";
const TS_PREFIX: char = 'p';
const TS_SECONDS_DIGITS: usize = 10;
const CHANNEL_PREFIXES: [char; 3] = ['C', 'D', 'G'];

/// Identifiers extracted from a message permalink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackUrl {
    /// Conversation id.
    pub channel_id: String,
    /// Message timestamp.
    pub ts: String,
    /// Parent thread timestamp when the link points into a thread.
    pub thread_ts: Option<String>,
}

impl SlackUrl {
    /// Parse a permalink.
    ///
    /// # Errors
    ///
    /// Returns a [`SlackUrlError`] when the text is not a URL or lacks a
    /// channel id or a well-formed message timestamp.
    pub fn parse(raw: &str) -> SlackUrlResult<Self> {
        let url = Url::parse(raw.trim()).map_err(|source| SlackUrlError::Parse { source })?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();

        let channel_id = segments
            .iter()
            .find(|segment| segment.starts_with(CHANNEL_PREFIXES))
            .map(|segment| (*segment).to_string())
            .ok_or(SlackUrlError::MissingChannel)?;

        let ts_segment = segments
            .iter()
            .find(|segment| segment.starts_with(TS_PREFIX))
            .ok_or(SlackUrlError::MissingTimestamp)?;
        let ts = parse_ts(ts_segment)?;

        let thread_ts = url
            .query_pairs()
            .find(|(key, _)| *key == THREAD_TS_KEY)
            .map(|(_, value)| value.into_owned());

        Ok(Self {
            channel_id,
            ts,
            thread_ts,
        })
    }

    /// Canonical primary record name: the channel id followed by the distinct
    /// thread and message timestamps in sorted order.
    #[must_use]
    pub fn file_name(&self) -> FileName {
        let thread_ts = self.thread_ts.as_deref().unwrap_or(&self.ts);
        let timestamps: BTreeSet<&str> = [thread_ts, self.ts.as_str()].into_iter().collect();
        let mut parts = vec![self.channel_id.as_str()];
        parts.extend(timestamps);
        FileName(format!("{}.json", parts.join("-")))
    }
}

fn parse_ts(segment: &str) -> SlackUrlResult<String> {
    let digits = segment.trim_start_matches(TS_PREFIX);
    if digits.len() <= TS_SECONDS_DIGITS || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(SlackUrlError::InvalidTimestamp {
            segment: segment.to_string(),
        });
    }
    let (seconds, fraction) = digits.split_at(TS_SECONDS_DIGITS);
    Ok(format!("{seconds}.{fraction}"))
}

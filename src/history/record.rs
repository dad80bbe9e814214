use std::path::PathBuf;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::{RequestRecord, ResponseRecord};

pub const MAX_FILE_NAME_LEN: usize = 200;
pub const EXTENSION: &str = ".json";

/// Digits in the `__NNN` suffix added when a name is already taken.
pub const SUFFIX_DIGITS: usize = 3;
const MAX_STEM_LEN: usize = MAX_FILE_NAME_LEN - EXTENSION.len() - 2 - SUFFIX_DIGITS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordMode {
    Http,
    Replay,
}

impl std::fmt::Display for RecordMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordMode::Http => f.write_str("http"),
            RecordMode::Replay => f.write_str("replay"),
        }
    }
}

/// One request/response pair as persisted in the history directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub name: String,
    pub version: String,
    pub args: Vec<String>,
    pub mode: RecordMode,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub duration_ms: u64,
    pub input_file_path: Option<PathBuf>,
    pub output_file_path: Option<PathBuf>,
    pub request: RequestRecord,
    pub response: ResponseRecord,
}

impl HistoryRecord {
    /// File name without extension: `{timestamp}__{METHOD}__{url}`.
    pub fn file_stem(&self) -> Result<String> {
        file_stem(&self.start_time, &self.request.method, &self.request.url)
    }
}

pub fn file_stem(start: &DateTime<Local>, method: &str, url: &str) -> Result<String> {
    let mut stem = format!(
        "{}__{}__{}",
        start.format("%Y_%m_%d_%H_%M_%S"),
        sanitize(method)?,
        sanitize(url)?
    );
    stem.truncate(floor_char_boundary(&stem, MAX_STEM_LEN));
    Ok(stem)
}

/// Name to try on the `attempt`-th write (1-based) of a record with `stem`.
///
/// Every attempt keeps the same stem prefix and the suffix has a fixed width,
/// so later attempts always sort after earlier ones.
pub fn candidate_file_name(stem: &str, attempt: usize) -> String {
    let stem = &stem[..floor_char_boundary(stem, MAX_STEM_LEN)];
    if attempt <= 1 {
        format!("{stem}{EXTENSION}")
    } else {
        format!("{stem}__{attempt:0width$}{EXTENSION}", width = SUFFIX_DIGITS)
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Maps everything outside `[A-Za-z0-9_]` to `_` and collapses runs of `_`.
pub fn sanitize(raw: &str) -> Result<String> {
    let invalid = Regex::new("[^A-Za-z0-9_]")?;
    let runs = Regex::new("_+")?;
    let replaced = invalid.replace_all(raw, "_");
    Ok(runs.replace_all(&replaced, "_").into_owned())
}

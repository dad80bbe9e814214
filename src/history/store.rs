use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::record::{candidate_file_name, HistoryRecord};
use crate::error::{RhttpError, Result};
use crate::files::{write_new, write_output};

const MAX_NAME_ATTEMPTS: usize = 100;

/// Paging and filtering for [`HistoryStore::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Records to pass over before collecting; non-matching records count too.
    pub skip: usize,
    /// Maximum records to collect; 0 means unbounded.
    pub limit: usize,
    pub find: String,
    pub case_insensitive: bool,
}

impl ListQuery {
    fn matches(&self, file_name: &str) -> bool {
        self.find.is_empty()
            || file_name.contains(&self.find)
            || (self.case_insensitive
                && file_name
                    .to_lowercase()
                    .contains(&self.find.to_lowercase()))
    }
}

/// A history file together with its display index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 1-based position in the newest-first order of the whole directory.
    pub index: usize,
    pub file_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    pub entries: Vec<HistoryEntry>,
    /// Non-hidden records in the directory.
    pub total: usize,
    pub skipped: usize,
}

impl Listing {
    pub fn display_indexes(&self) -> Vec<usize> {
        self.entries.iter().map(|entry| entry.index).collect()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return writeln!(f, "Nothing in history.");
        }
        if self.entries.is_empty() {
            return writeln!(f, "No results matching criteria.");
        }
        writeln!(
            f,
            "Displaying {} to {} of {} - Use skip and limit flags to page.",
            self.skipped + 1,
            self.skipped + 1 + self.entries.len(),
            self.total
        )?;
        writeln!(f)?;
        for entry in &self.entries {
            writeln!(f, "{}. {}", entry.index, entry.file_name)?;
        }
        Ok(())
    }
}

/// The history directory: one JSON file per record, newest sorts last.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Failed to create directory {}: {}", dir.display(), err),
            )
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every visible record, newest first, numbered before any filtering.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') || !entry.file_type()?.is_file() {
                continue;
            }
            names.push(name);
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        log::debug!("{} records in {}", names.len(), self.dir.display());

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(i, file_name)| HistoryEntry {
                index: i + 1,
                file_name,
            })
            .collect())
    }

    pub fn list(&self, query: &ListQuery) -> Result<Listing> {
        let all = self.entries()?;
        let total = all.len();

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for entry in all {
            if query.limit > 0 && entries.len() >= query.limit {
                break;
            }
            if skipped >= query.skip && query.matches(&entry.file_name) {
                entries.push(entry);
            } else {
                skipped += 1;
            }
        }

        Ok(Listing {
            entries,
            total,
            skipped,
        })
    }

    /// Finds the entry shown as `index` in an unfiltered listing.
    pub fn locate(&self, index: i64) -> Result<HistoryEntry> {
        let query = ListQuery {
            skip: usize::try_from(index.saturating_sub(1)).unwrap_or(0),
            limit: 1,
            find: String::new(),
            case_insensitive: true,
        };
        let mut listing = self.list(&query)?;
        if listing.entries.len() != 1 {
            return Err(RhttpError::NoHistoryRecords);
        }
        let entry = listing.entries.remove(0);
        if i64::try_from(entry.index).ok() != Some(index) {
            return Err(RhttpError::InvalidHistoryIndex(index.to_string()));
        }
        Ok(entry)
    }

    pub fn load(&self, entry: &HistoryEntry) -> Result<HistoryRecord> {
        let path = self.dir.join(&entry.file_name);
        let data = fs::read(&path).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Error reading history file {}: {}", entry.file_name, err),
            )
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn load_by_index(&self, index: i64) -> Result<HistoryRecord> {
        let entry = self.locate(index)?;
        self.load(&entry)
    }

    /// Writes `record` as a new file and returns its path. Never overwrites.
    pub fn append(&self, record: &HistoryRecord) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(record)?;
        let stem = record.file_stem()?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = candidate_file_name(&stem, attempt);
            let target = self.dir.join(&name);
            if target.exists() {
                continue;
            }

            let staging = self
                .dir
                .join(format!(".{}.{}.tmp", name, std::process::id()));
            write_new(&staging, &json)?;
            let linked = fs::hard_link(&staging, &target);
            let cleanup = fs::remove_file(&staging);
            match settle_link(&staging, linked, cleanup) {
                Ok(()) => {
                    log::info!("Saved history record {}", target.display());
                    return Ok(target);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Too many history records named {stem}"),
        )
        .into())
    }

    /// Copies the response body of record `index` to `path`; returns the byte count.
    pub fn save_body(&self, index: i64, path: &Path) -> Result<usize> {
        let record = self.load_by_index(index)?;
        write_output(path, &record.response.body)?;
        Ok(record.response.body.len())
    }
}

/// The link result decides the append; a leftover staging file only warns.
fn settle_link(staging: &Path, linked: io::Result<()>, cleanup: io::Result<()>) -> io::Result<()> {
    if let Err(err) = cleanup {
        log::warn!(
            "Failed to remove staging file {}: {}",
            staging.display(),
            err
        );
    }
    linked
}

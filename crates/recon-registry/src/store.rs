//! JSON-file registry of persisted suspects.

use crate::error::{RegistryError, Result};
use recon_core::AccountRecord;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Ordered, duplicate-free collection of suspects keyed by username.
///
/// Usernames compare ASCII case-insensitively, matching how the lookup
/// service treats logins.
#[derive(Debug)]
pub struct Registry {
    /// Findings file backing this registry
    path: PathBuf,
    /// Records in insertion order
    records: Vec<AccountRecord>,
    /// Lower-cased usernames of `records`
    index: HashSet<String>,
    /// The file on disk failed to parse and must be moved aside before the first write
    malformed: bool,
}

impl Registry {
    /// Create an empty registry that will persist to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            index: HashSet::new(),
            malformed: false,
        }
    }

    /// Load the registry from `path`.
    ///
    /// A missing file yields an empty registry. A malformed file is logged and
    /// also yields an empty registry; it is renamed to `<name>.corrupt` before
    /// the first new suspect is written, never overwritten.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut registry = Self::empty(path);

        let records = match read_findings(&registry.path) {
            Ok(records) => records,
            Err(e) => {
                registry.malformed = matches!(e, RegistryError::Malformed { .. });
                warn!(tag = "ERROR", error = %e, "findings store unreadable, starting empty");
                return registry;
            }
        };

        for record in records {
            let key = record.username().to_ascii_lowercase();
            if registry.index.insert(key) {
                registry.records.push(record);
            } else {
                warn!(username = %record.username(), "duplicate username in findings store, keeping first");
            }
        }

        debug!(
            path = %registry.path.display(),
            count = registry.records.len(),
            "loaded findings store"
        );

        registry
    }

    /// Whether `username` has been persisted.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.index.contains(&username.to_ascii_lowercase())
    }

    /// Add a suspect and durably persist the whole collection before returning.
    ///
    /// Returns `Ok(false)` without touching disk if the username is already
    /// present. On a write failure the in-memory state is rolled back so it
    /// keeps matching what is on disk.
    ///
    /// # Errors
    /// Returns `NotSuspect` for unflagged records, or the persistence error.
    pub fn append(&mut self, record: AccountRecord) -> Result<bool> {
        if !record.suspect {
            return Err(RegistryError::NotSuspect {
                username: record.username().to_string(),
            });
        }

        let key = record.username().to_ascii_lowercase();
        if self.index.contains(&key) {
            debug!(username = %record.username(), "suspect already recorded");
            return Ok(false);
        }

        if self.malformed {
            self.set_aside_malformed()?;
        }

        self.records.push(record);
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        self.index.insert(key);

        info!(
            path = %self.path.display(),
            count = self.records.len(),
            "findings store updated"
        );

        Ok(true)
    }

    /// Persisted records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[AccountRecord] {
        &self.records
    }

    /// Usernames of all persisted records.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(AccountRecord::username)
    }

    /// Number of persisted records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Findings file backing this registry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the unparsable findings file out of the way, keeping any earlier backup.
    fn set_aside_malformed(&mut self) -> Result<()> {
        let backup = corrupt_backup_path(&self.path);
        std::fs::rename(&self.path, &backup).map_err(|source| RegistryError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        self.malformed = false;

        warn!(
            tag = "ERROR",
            path = %self.path.display(),
            backup = %backup.display(),
            "moved malformed findings store aside"
        );
        Ok(())
    }

    /// Replace the findings file with the current collection.
    fn persist(&self) -> Result<()> {
        let io_err = |source| RegistryError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, &self.records)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        Ok(())
    }
}

/// First free `<name>.corrupt`, `<name>.corrupt.1`, ... next to `path`.
fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    let base = path.with_file_name(name);

    let mut candidate = base.clone();
    let mut n = 0u32;
    while candidate.exists() {
        n += 1;
        let mut name = base.as_os_str().to_os_string();
        name.push(format!(".{n}"));
        candidate = PathBuf::from(name);
    }
    candidate
}

/// Read the findings store without taking ownership of it.
///
/// This is the read-only view a dashboard serves. A missing file reads as an
/// empty collection.
///
/// # Errors
/// Returns error if the file exists but can't be read or parsed.
pub fn read_findings(path: &Path) -> Result<Vec<AccountRecord>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RegistryError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&contents).map_err(|source| RegistryError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

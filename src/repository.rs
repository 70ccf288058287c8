// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Durable space storage.
//!
//! Cmdbox keeps every space in one place called the __store__. The store can
//! generally be placed anywhere on the user's file system, with the default
//! location being `$XDG_DATA_HOME/cmdbox`.
//!
//! # Store Layout
//!
//! Inside the store lives a `spaces` directory holding one JSON file per
//! space, named after the filesystem-safe encoding of the space's selector:
//!
//! ```text
//! spaces/shell.json           local-only space "shell"
//! spaces/awkless:shell.json   user awkless's space "shell"
//! spaces/dplabs=shell.json    organization dplabs's space "shell"
//! ```
//!
//! File content is the 2-space-indented JSON serialization of the space,
//! entries included. The `id` fields inside the content are the single source
//! of truth for addressing. Filenames are only a derived cache that makes
//! directory scanning cheap, and a file renamed out-of-band simply loads
//! under the address its content declares.
//!
//! # Renames Are Not Atomic
//!
//! Changing a space's label or namespace changes its filename. The store
//! offers no multi-file transaction, so a rename is two separate steps: the
//! space is written under its new name, and the file under the old name is
//! removed afterwards. [`Repository::rename`] hands back a [`StaleEntry`]
//! token for that second step, so no call site can forget it silently. A
//! crash between the two steps leaves an orphan file, which a later load
//! treats as a distinct, valid space under its own address.

use crate::{
    model::Space,
    selector::{ParseError, Selector},
};

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument, warn};

const PATH_SPACES: &str = "spaces";
const EXTENSION: &str = "json";

/// File-backed space storage.
#[derive(Debug)]
pub struct Repository {
    spaces_dir: PathBuf,
    fresh: bool,
}

impl Repository {
    /// Open the store at the target path.
    ///
    /// Creates the `spaces` directory if it does not exist yet, and remembers
    /// whether it had to, so callers can run first-time setup.
    ///
    /// # Errors
    ///
    /// - Return [`StorageError::CreateStore`] if the spaces directory cannot
    ///   be created.
    #[instrument(skip(path), level = "debug")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let spaces_dir = path.as_ref().join(PATH_SPACES);
        let fresh = !spaces_dir.exists();
        mkdirp::mkdirp(&spaces_dir).map_err(|err| StorageError::CreateStore {
            source: err,
            path: spaces_dir.clone(),
        })?;

        debug!("open store at {:?}", spaces_dir.display());

        Ok(Self { spaces_dir, fresh })
    }

    /// Whether the store was freshly created by [`Repository::open`].
    pub fn is_first_run(&self) -> bool {
        self.fresh
    }

    /// Load every space in the store.
    ///
    /// Scans the spaces directory for `.json` entries, skipping everything
    /// else. The filename stem only locates each file. The authoritative
    /// selector is re-derived from the `id` inside the content, and a
    /// mismatch between the two is logged as an out-of-band rename with the
    /// content winning.
    ///
    /// # Errors
    ///
    /// - Return [`StorageError::ScanPattern`] or [`StorageError::ScanEntry`]
    ///   if the directory scan fails.
    /// - Return [`StorageError::ReadSpace`] if a space file cannot be read.
    /// - Return [`StorageError::DeserializeSpace`] if a space file is not
    ///   valid JSON for a space record.
    /// - Return [`StorageError::InvalidId`] if a space or command `id` inside
    ///   content is not a valid selector. A corrupted store is surfaced, not
    ///   silently repaired.
    #[instrument(skip(self), level = "debug")]
    pub fn load_all(&self) -> Result<Vec<Space>> {
        let pattern = self
            .spaces_dir
            .join(format!("*.{}", EXTENSION))
            .to_string_lossy()
            .into_owned();
        let paths = glob::glob(&pattern).map_err(|err| StorageError::ScanPattern {
            source: err,
            path: self.spaces_dir.clone(),
        })?;

        let mut spaces = Vec::new();
        for entry in paths {
            let path = entry.map_err(|err| StorageError::ScanEntry {
                source: err,
                path: self.spaces_dir.clone(),
            })?;
            spaces.push(self.load_file(&path)?);
        }

        Ok(spaces)
    }

    fn load_file(&self, path: &Path) -> Result<Space> {
        let raw = fs::read_to_string(path).map_err(|err| StorageError::ReadSpace {
            source: err,
            path: path.to_path_buf(),
        })?;

        let mut space: Space =
            serde_json::from_str(&raw).map_err(|err| StorageError::DeserializeSpace {
                source: err,
                path: path.to_path_buf(),
            })?;

        space.selector =
            Selector::parse_mandatory_space(&space.id).map_err(|err| StorageError::InvalidId {
                source: err,
                id: space.id.clone(),
                path: path.to_path_buf(),
            })?;

        for command in &mut space.entries {
            command.selector = Selector::parse_mandatory_item(&command.id).map_err(|err| {
                StorageError::InvalidId {
                    source: err,
                    id: command.id.clone(),
                    path: path.to_path_buf(),
                }
            })?;
        }

        // The stem is only a scan cache. When it disagrees with the content,
        // the file was renamed out-of-band and the content address wins.
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        match Selector::from_filename_stem(&stem) {
            Ok(provisional) if provisional == space.selector.space_level() => {}
            _ => warn!(
                "space file {:?} does not match its content address '{}'",
                path.display(),
                space.selector
            ),
        }

        Ok(space)
    }

    /// Persist one space to its file.
    ///
    /// Recomputes the space's `id` from its selector and rewrites every
    /// contained command's selector and `id` from the owning space first, so
    /// addresses inside content can never drift apart from the space that
    /// owns them. The write itself is last-writer-wins at the file-system
    /// level, with no partial-write recovery.
    ///
    /// # Errors
    ///
    /// - Return [`StorageError::SerializeSpace`] if JSON generation fails.
    /// - Return [`StorageError::WriteSpace`] if the file cannot be written.
    #[instrument(skip(self, space), level = "debug")]
    pub fn persist(&self, space: &mut Space) -> Result<()> {
        // INVARIANT: content addresses are rewritten from the owning space,
        // never assumed to already agree.
        space.rebind_addresses();

        let raw =
            serde_json::to_string_pretty(space).map_err(|err| StorageError::SerializeSpace {
                source: err,
                id: space.id.clone(),
            })?;

        let path = self.space_file(&space.selector);
        debug!("persist space '{}' to {:?}", space.id, path.display());
        fs::write(&path, raw).map_err(|err| StorageError::WriteSpace {
            source: err,
            path,
        })?;

        Ok(())
    }

    /// Persist a space whose address may have changed.
    ///
    /// First phase of the two-step rename: writes the space under its current
    /// address, then reports whether a file under the previous address became
    /// stale. The caller completes the rename by passing the returned token
    /// to [`Repository::remove_stale`]. Until then both files exist.
    ///
    /// # Errors
    ///
    /// - Same failures as [`Repository::persist`].
    pub fn rename(&self, space: &mut Space, previous: &Selector) -> Result<Option<StaleEntry>> {
        self.persist(space)?;

        if previous.filename() == space.selector.filename() {
            return Ok(None);
        }

        Ok(Some(StaleEntry {
            selector: previous.space_level(),
        }))
    }

    /// Second phase of the two-step rename: remove the stale file.
    ///
    /// # Errors
    ///
    /// - Return [`StorageError::DeleteSpace`] if the stale file cannot be
    ///   removed.
    pub fn remove_stale(&self, stale: StaleEntry) -> Result<()> {
        self.delete(&stale.selector)
    }

    /// Remove the file of the space addressed by the selector.
    ///
    /// Nothing is ever deleted implicitly. Callers invoke this exactly when a
    /// deletion or completed rename makes a previously-written file obsolete.
    ///
    /// # Errors
    ///
    /// - Return [`StorageError::DeleteSpace`] if the file does not exist or
    ///   cannot be removed.
    #[instrument(skip(self), level = "debug")]
    pub fn delete(&self, selector: &Selector) -> Result<()> {
        let path = self.space_file(selector);
        debug!("delete space file {:?}", path.display());
        fs::remove_file(&path).map_err(|err| StorageError::DeleteSpace {
            source: err,
            path,
        })?;

        Ok(())
    }

    fn space_file(&self, selector: &Selector) -> PathBuf {
        self.spaces_dir
            .join(format!("{}.{}", selector.filename(), EXTENSION))
    }
}

/// Pending second phase of a space rename.
///
/// Holds the previous address whose file is now stale. Dropping the token
/// without passing it to [`Repository::remove_stale`] leaves an orphan file
/// in the store.
#[must_use = "a stale space file stays on disk until removed through the repository"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaleEntry {
    selector: Selector,
}

impl StaleEntry {
    /// Previous address whose file became stale.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// Storage error types.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Spaces directory cannot be created when missing.
    #[error("failed to create spaces directory at {:?}", path.display())]
    CreateStore {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Spaces directory scan pattern is malformed.
    #[error("failed to build scan pattern for spaces directory at {:?}", path.display())]
    ScanPattern {
        #[source]
        source: glob::PatternError,
        path: PathBuf,
    },

    /// A directory entry cannot be read during the scan.
    #[error("failed to scan spaces directory at {:?}", path.display())]
    ScanEntry {
        #[source]
        source: glob::GlobError,
        path: PathBuf,
    },

    /// Space file cannot be read.
    #[error("failed to read space file at {:?}", path.display())]
    ReadSpace {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Space file holds invalid JSON.
    #[error("failed to parse space file at {:?}", path.display())]
    DeserializeSpace {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// An `id` inside space file content is not a valid selector.
    #[error("space file at {:?} carries invalid id {id:?}", path.display())]
    InvalidId {
        #[source]
        source: ParseError,
        id: String,
        path: PathBuf,
    },

    /// Space cannot be serialized to JSON.
    #[error("failed to generate JSON for space '{id}'")]
    SerializeSpace {
        #[source]
        source: serde_json::Error,
        id: String,
    },

    /// Space file cannot be written.
    #[error("failed to write space file at {:?}", path.display())]
    WriteSpace {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Space file cannot be removed.
    #[error("failed to remove space file at {:?}", path.display())]
    DeleteSpace {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = StorageError> = std::result::Result<T, E>;

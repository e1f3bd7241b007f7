// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias store management and manipulation.
//!
//! The __alias store__ is the pair of files that alias-manager owns: the alias
//! document, and the alias script derived from it. The store is the only
//! component that reads or writes either file.
//!
//! # Store Layout
//!
//! By default both files live in `$XDG_DATA_HOME/alias-manager`:
//!
//! - `aliases.json`: the alias document, see [`AliasDocument`].
//! - `aliases.sh`: the alias script, see [`script`].
//!
//! Every write of the alias document is followed by a full regeneration of the
//! alias script. Both files are written to a temporary sibling first, and
//! renamed into place, so a shell sourcing the alias script never sees half of
//! it.
//!
//! # Concurrency
//!
//! There is no locking. Alias-manager assumes one interactive user, so two
//! invocations racing each other simply means that the last writer wins.

pub mod script;

use crate::{
    atomic::write_atomic,
    config::Settings,
    document::{AliasDocument, DocumentError},
    import::{
        merge::{merge, MergeReport},
        parse_file, ImportError, ImportedGroups,
    },
    validate::ValidationError,
};

use std::{
    fs::{read_to_string, remove_file},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Handle to alias store.
#[derive(Debug, Clone, Copy)]
pub struct Store<'cfg> {
    settings: &'cfg Settings,
}

/// Result of [`Store::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit<T> {
    /// Value returned by the editor.
    pub outcome: T,

    /// Alias document after the edit.
    pub document: AliasDocument,

    /// Whether the edit changed, and thus persisted, the alias document.
    pub changed: bool,
}

impl<'cfg> Store<'cfg> {
    /// Construct new alias store handle.
    pub fn new(settings: &'cfg Settings) -> Self {
        Self { settings }
    }

    /// Path to alias document.
    pub fn data_file(&self) -> &Path {
        &self.settings.data_file
    }

    /// Path to alias script.
    pub fn script_file(&self) -> &Path {
        &self.settings.script_file
    }

    /// Load alias document.
    ///
    /// A missing alias document yields a fresh document with an empty default
    /// group. A malformed alias document is repaired, see
    /// [`AliasDocument::from_value`].
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Read`] if alias document cannot be read.
    /// - Return [`StoreError::Parse`] if alias document is not valid JSON.
    #[instrument(skip(self), level = "debug")]
    pub fn load(&self) -> Result<AliasDocument> {
        let path = self.data_file();
        let data = match read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no alias document at {:?}, starting fresh", path.display());
                return Ok(AliasDocument::default());
            }
            Err(err) => {
                return Err(StoreError::Read {
                    source: err,
                    path: path.to_path_buf(),
                })
            }
        };

        parse_document(&data, path)
    }

    /// Save alias document.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Validation`] if alias document holds invalid
    ///   names or commands. Nothing is written in that case.
    /// - Return [`StoreError::Write`] if alias document cannot be written.
    #[instrument(skip(self, document), level = "debug")]
    pub fn save(&self, document: &AliasDocument) -> Result<()> {
        document.check()?;

        let mut contents = document.to_string();
        contents.push('\n');
        write_atomic(self.data_file(), contents).map_err(|err| StoreError::Write {
            source: err,
            path: self.data_file().to_path_buf(),
        })
    }

    /// Regenerate alias script from alias document.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Write`] if alias script cannot be written.
    #[instrument(skip(self, document), level = "debug")]
    pub fn generate_alias_file(&self, document: &AliasDocument) -> Result<()> {
        write_atomic(self.script_file(), script::render(document)).map_err(|err| {
            StoreError::Write {
                source: err,
                path: self.script_file().to_path_buf(),
            }
        })
    }

    /// Save alias document, and regenerate alias script from it.
    ///
    /// The alias script is rendered before anything is written. If the alias
    /// script cannot be written, the previous alias document is put back so
    /// that both files keep matching each other.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if either [`Store::save`] or
    ///   [`Store::generate_alias_file`] fail.
    #[instrument(skip(self, document), level = "debug")]
    pub fn persist(&self, document: &AliasDocument) -> Result<()> {
        let rendered = script::render(document);
        let previous = match read_to_string(self.data_file()) {
            Ok(data) => Some(data),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                return Err(StoreError::Read {
                    source: err,
                    path: self.data_file().to_path_buf(),
                })
            }
        };

        self.save(document)?;

        if let Err(err) = write_atomic(self.script_file(), rendered) {
            let rollback = match previous {
                Some(data) => write_atomic(self.data_file(), data),
                None => remove_file(self.data_file()),
            };
            if let Err(rollback_err) = rollback {
                warn!(
                    "failed to restore {:?}: {rollback_err}",
                    self.data_file().display()
                );
            }

            return Err(StoreError::Write {
                source: err,
                path: self.script_file().to_path_buf(),
            });
        }

        Ok(())
    }

    /// Edit alias document.
    ///
    /// Loads alias document, and hands it to the editor. The alias document is
    /// persisted if and only if the editor succeeds and actually changes it.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Document`] if editor fails. Nothing is written.
    /// - Return [`StoreError`] if alias document cannot be loaded or
    ///   persisted.
    pub fn edit<T, E>(&self, editor: E) -> Result<Edit<T>>
    where
        E: FnOnce(&mut AliasDocument) -> Result<T, DocumentError>,
    {
        let before = self.load()?;
        let mut document = before.clone();
        let outcome = editor(&mut document)?;

        let changed = document != before;
        if changed {
            self.persist(&document)?;
        }

        Ok(Edit {
            outcome,
            document,
            changed,
        })
    }

    /// Parse aliases out of a shell configuration file.
    ///
    /// Uses configured shell startup file when no path is given. The alias
    /// store itself is not touched.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Import`] if file cannot be read.
    #[instrument(skip(self), level = "debug")]
    pub fn import_from_file(&self, path: Option<&Path>) -> Result<ImportedGroups> {
        let path = path.unwrap_or(&self.settings.shell_config);
        info!("import aliases from {:?}", path.display());
        Ok(parse_file(path)?)
    }

    /// Merge imported aliases into alias document.
    ///
    /// Persists alias document only if something was added.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if alias document cannot be loaded or
    ///   persisted.
    #[instrument(skip(self, imported), level = "debug")]
    pub fn merge_imported_data(&self, imported: &ImportedGroups) -> Result<MergeReport> {
        let mut document = self.load()?;
        let report = merge(&mut document, imported);

        if report.changed() {
            self.persist(&document)?;
        }

        Ok(report)
    }

    /// Write copy of alias document to target path.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if alias document cannot be loaded, or backup
    ///   cannot be written.
    #[instrument(skip(self, path), level = "debug")]
    pub fn backup(&self, path: impl AsRef<Path>) -> Result<AliasDocument> {
        let document = self.load()?;

        let mut contents = document.to_string();
        contents.push('\n');
        write_atomic(path.as_ref(), contents).map_err(|err| StoreError::Write {
            source: err,
            path: path.as_ref().to_path_buf(),
        })?;

        Ok(document)
    }

    /// Replace alias document with contents of backup file.
    ///
    /// Backup goes through the same repairs as [`Store::load`].
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Read`] if backup cannot be read.
    /// - Return [`StoreError::Parse`] if backup is not valid JSON.
    /// - Return [`StoreError`] if restored document cannot be persisted.
    #[instrument(skip(self, path), level = "debug")]
    pub fn restore(&self, path: impl AsRef<Path>) -> Result<AliasDocument> {
        let document = read_document(path.as_ref())?;
        self.persist(&document)?;

        Ok(document)
    }
}

/// Read alias document from arbitrary file with lenient decoding.
///
/// # Errors
///
/// - Return [`StoreError::Read`] if file cannot be read.
/// - Return [`StoreError::Parse`] if file is not valid JSON.
pub fn read_document(path: impl AsRef<Path>) -> Result<AliasDocument> {
    let path = path.as_ref();
    let data = read_to_string(path).map_err(|err| StoreError::Read {
        source: err,
        path: path.to_path_buf(),
    })?;

    parse_document(&data, path)
}

fn parse_document(data: &str, path: &Path) -> Result<AliasDocument> {
    data.parse().map_err(|err| StoreError::Parse {
        source: err,
        path: path.to_path_buf(),
    })
}

/// All possible error types for alias store interaction.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Alias document manipulation failed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Alias document holds invalid data.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Shell configuration file cannot be imported.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// File cannot be read.
    #[error("failed to read {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be written.
    #[error("failed to write {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File is not valid JSON.
    #[error("failed to parse alias document at {:?}", path.display())]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

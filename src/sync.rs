// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git synchronization of the alias document.
//!
//! Users with more than one machine can keep a copy of their alias document,
//! called the __sync file__, inside of a Git work tree that they push to a
//! shared remote. Alias-manager never manages that remote itself. It only
//! pulls before applying the sync file locally, and optionally commits and
//! pushes the sync file after local changes.
//!
//! # Failure Model
//!
//! Pulling happens before any local file is touched. If the work tree cannot
//! be opened, or `git pull` fails, the alias store stays exactly as it was.

use crate::{
    atomic::write_atomic,
    config::SyncSettings,
    document::AliasDocument,
    store::{read_document, Store, StoreError},
};

use git2::{Oid, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
    process::Command,
    time::Duration,
};
use tracing::{debug, info, instrument};

/// Outcome of pulling the sync file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pulled {
    /// Work tree had no sync file, so one was created from the local alias
    /// document.
    Created,

    /// Sync file was applied to the local alias store.
    Applied(AliasDocument),
}

/// Git synchronization of alias document.
#[derive(Debug, Clone, Copy)]
pub struct Syncer<'cfg> {
    settings: &'cfg SyncSettings,
}

impl<'cfg> Syncer<'cfg> {
    /// Construct new syncer.
    pub fn new(settings: &'cfg SyncSettings) -> Self {
        Self { settings }
    }

    /// Pull remote changes, and apply sync file to local alias store.
    ///
    /// Creates the sync file from the local alias document if the work tree
    /// does not have one yet.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Git2`] if work tree cannot be opened.
    /// - Return [`SyncError::Syscall`] if `git pull` fails.
    /// - Return [`SyncError::Store`] if sync file cannot be read, or the
    ///   alias store cannot be updated.
    #[instrument(skip(self, store), level = "debug")]
    pub fn pull(&self, store: &Store<'_>) -> Result<Pulled> {
        // INVARIANT: Nothing local is touched until pull succeeds.
        let _repo = self.open()?;
        let output = self.git(["pull"], "pull")?;
        if !output.is_empty() {
            info!("{output}");
        }

        let sync_file = &self.settings.sync_file;
        if !sync_file.exists() {
            info!("no sync file at {:?}, creating it", sync_file.display());
            let document = store.load()?;
            self.write_sync_file(&document)?;
            return Ok(Pulled::Created);
        }

        let document = read_document(sync_file)?;
        store.persist(&document)?;

        Ok(Pulled::Applied(document))
    }

    /// Write sync file, commit it, and push it.
    ///
    /// Returns `false` if the sync file did not change, in which case nothing
    /// is committed or pushed.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Git2`] if sync file cannot be committed.
    /// - Return [`SyncError::Syscall`] if `git push` fails.
    /// - Return [`SyncError::Store`] if sync file cannot be written.
    #[instrument(skip(self, document), level = "debug")]
    pub fn publish(&self, document: &AliasDocument, message: &str) -> Result<bool> {
        let repo = self.open()?;
        self.write_sync_file(document)?;

        let Some(oid) = self.commit_sync_file(&repo, message)? else {
            debug!("sync file unchanged, nothing to push");
            return Ok(false);
        };
        info!("committed {oid}: {message}");

        let output = self.git(["push"], "push")?;
        if !output.is_empty() {
            info!("{output}");
        }

        Ok(true)
    }

    fn open(&self) -> Result<Repository> {
        debug!("open sync work tree {:?}", self.settings.repo_dir.display());
        Ok(Repository::open(&self.settings.repo_dir)?)
    }

    fn write_sync_file(&self, document: &AliasDocument) -> Result<()> {
        let path = &self.settings.sync_file;
        let mut contents = document.to_string();
        contents.push('\n');
        write_atomic(path, contents).map_err(|err| {
            SyncError::Store(StoreError::Write {
                source: err,
                path: path.clone(),
            })
        })
    }

    /// Stage and commit sync file to HEAD.
    ///
    /// Returns `None` if staging the sync file does not change the tree of
    /// HEAD.
    fn commit_sync_file(&self, repo: &Repository, message: &str) -> Result<Option<Oid>> {
        let relative = self
            .settings
            .sync_file
            .strip_prefix(&self.settings.repo_dir)
            .map_err(|_| SyncError::OutsideWorkTree {
                path: self.settings.sync_file.clone(),
            })?;

        let mut index = repo.index()?;
        index.add_path(relative)?;
        index.write()?;
        let tree_oid = index.write_tree()?;

        // INVARIANT: Always determine latest parent commit to append to.
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        if parent.as_ref().is_some_and(|parent| parent.tree_id() == tree_oid) {
            return Ok(None);
        }

        let tree = repo.find_tree(tree_oid)?;
        let signature = repo.signature()?;
        let parents = parent.iter().collect::<Vec<_>>();
        let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        Ok(Some(oid))
    }

    fn git<const N: usize>(&self, args: [&str; N], label: &str) -> Result<String> {
        let mut bin_args: Vec<OsString> = vec!["-C".into(), self.settings.repo_dir.clone().into()];
        bin_args.extend(args.iter().map(OsString::from));

        let bar = spinner(format!("git {label}"))?;
        let output = syscall_non_interactive("git", bin_args);
        bar.finish_and_clear();

        output
    }
}

fn spinner(message: String) -> Result<ProgressBar> {
    let style = ProgressStyle::with_template("{spinner:.green} {elapsed_precise:.green}  {msg}")?;
    let bar = ProgressBar::new_spinner().with_style(style).with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    Ok(bar)
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let output = Command::new(cmd.as_ref()).args(args).output()?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(stdout.trim_end());
    }

    if !stderr.is_empty() {
        if !message.is_empty() {
            message.push('\n');
        }
        message.push_str(stderr.trim_end());
    }

    if !output.status.success() {
        return Err(SyncError::Syscall(std::io::Error::other(format!(
            "command {:?} failed:\n{message}",
            cmd.as_ref()
        ))));
    }

    Ok(message)
}

/// Build commit message for a change to the alias document.
pub fn commit_message(summary: impl AsRef<str>) -> String {
    format!("feat: {}", summary.as_ref())
}

/// Git synchronization error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// External git process fails.
    #[error(transparent)]
    Syscall(#[from] std::io::Error),

    /// Alias store cannot be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Sync file does not live inside of the work tree.
    #[error("sync file {:?} is outside of sync work tree", path.display())]
    OutsideWorkTree { path: PathBuf },

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{RepoFixture, RepoKind, StoreFixture};

use alias_manager::{
    config::{Settings, ShellKind, SyncSettings},
    document::AliasDocument,
    store::Store,
    sync::{commit_message, Pulled, SyncError, Syncer},
};

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::path::Path;

fn sync_settings(repo_dir: &Path) -> SyncSettings {
    SyncSettings {
        repo_dir: repo_dir.to_path_buf(),
        sync_file: repo_dir.join(Settings::SYNC_FILE),
        auto_push: true,
    }
}

#[test]
fn publish_on_one_machine_and_pull_on_another() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let remote = RepoFixture::new(scratch.path().join("remote.git"), RepoKind::Bare)?;
    remote.stage_and_commit("README.md", "shared aliases\n")?;

    let laptop_dir = scratch.path().join("laptop");
    let desktop_dir = scratch.path().join("desktop");
    remote.clone_into(&laptop_dir)?;
    remote.clone_into(&desktop_dir)?;

    let laptop_sync = sync_settings(&laptop_dir);
    let desktop_sync = sync_settings(&desktop_dir);
    let laptop = StoreFixture::new(ShellKind::Zsh)?.with_sync(laptop_sync.clone());
    let desktop = StoreFixture::new(ShellKind::Zsh)?.with_sync(desktop_sync.clone());

    let edit = Store::new(laptop.settings())
        .edit(|document| document.add_alias("gs", "git status", "git"))?;
    let message = commit_message("add alias 'gs' to group 'git'");
    assert!(Syncer::new(&laptop_sync).publish(&edit.document, &message)?);
    assert_eq!(remote.head_message()?, message);

    let desktop_store = Store::new(desktop.settings());
    let pulled = Syncer::new(&desktop_sync).pull(&desktop_store)?;
    assert_eq!(pulled, Pulled::Applied(edit.document.clone()));
    assert_eq!(desktop_store.load()?, edit.document);
    assert!(desktop.script()?.contains("alias gs='git status'\n"));

    // INVARIANT: Publishing the same document twice pushes nothing new.
    assert!(!Syncer::new(&laptop_sync).publish(&edit.document, &message)?);

    Ok(())
}

#[test]
fn publish_without_remote_commits_then_fails_push() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let work_tree = scratch.path().join("work");
    let repo = RepoFixture::new(&work_tree, RepoKind::Normal)?;
    let sync = sync_settings(&work_tree);

    let mut document = AliasDocument::default();
    document.add_alias("gs", "git status", "git")?;
    let result = Syncer::new(&sync).publish(&document, &commit_message("add alias 'gs'"));

    assert!(matches!(result, Err(SyncError::Syscall(_))));
    assert_eq!(repo.head_message()?, "feat: add alias 'gs'");

    Ok(())
}

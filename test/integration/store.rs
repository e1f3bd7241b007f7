// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::StoreFixture;

use alias_manager::{
    config::ShellKind,
    document::{AliasEntry, DocumentError},
    store::{script::SCRIPT_HEADER, Store, StoreError},
    validate::ValidationError,
};

use anyhow::Result;
use indoc::{formatdoc, indoc};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn add_alias_lands_in_document_and_script() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let store = Store::new(fixture.settings());

    let edit = store.edit(|document| document.add_alias("gs", "git status", "git"))?;
    assert!(edit.changed);

    let document = store.load()?;
    assert_eq!(document.get("gs", "git"), Some(&AliasEntry::new("git status")));
    assert_eq!(document, edit.document);

    let expect = formatdoc! {r#"
        {header}
        # default

        # git
        alias gs='git status'
    "#, header = SCRIPT_HEADER};
    assert_eq!(fixture.script()?, expect);

    Ok(())
}

#[test]
fn disable_and_enable_toggle_script_line() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let store = Store::new(fixture.settings());
    store.edit(|document| document.add_alias("gs", "git status", "git"))?;

    let edit = store.edit(|document| document.set_alias_disabled("gs", "git", true))?;
    assert!(edit.outcome);
    assert!(!fixture.script()?.contains("alias gs="));

    let edit = store.edit(|document| document.set_alias_disabled("gs", "git", true))?;
    assert!(!edit.outcome);
    assert!(!edit.changed);

    store.edit(|document| document.set_alias_disabled("gs", "git", false))?;
    assert!(fixture.script()?.contains("alias gs='git status'\n"));

    Ok(())
}

#[test]
fn removing_last_alias_drops_group_but_keeps_default() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let store = Store::new(fixture.settings());
    store.edit(|document| document.add_alias("tmp", "echo tmp", "temp"))?;
    store.edit(|document| document.add_alias("hi", "echo hi", "default"))?;

    store.edit(|document| document.remove_alias("tmp", "temp"))?;
    store.edit(|document| document.remove_alias("hi", "default"))?;

    let document = store.load()?;
    assert_eq!(document.groups.keys().collect::<Vec<_>>(), vec!["default"]);
    assert!(document.groups["default"].is_empty());

    Ok(())
}

#[test]
fn reserved_name_is_rejected_before_any_write() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let store = Store::new(fixture.settings());

    let result = store.edit(|document| document.add_alias("ls", "ls -la", "default"));
    assert!(matches!(
        result,
        Err(StoreError::Document(DocumentError::Validation(
            ValidationError::ReservedName { .. }
        )))
    ));
    assert!(!store.data_file().exists());
    assert!(!store.script_file().exists());

    Ok(())
}

#[test]
fn restore_repairs_damaged_backup() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let store = Store::new(fixture.settings());
    store.edit(|document| document.add_alias("gs", "git status", "git"))?;

    let backup = fixture.settings().data_file.with_file_name("backup.json");
    let saved = store.backup(&backup)?;
    assert_eq!(store.load()?, saved);

    fs::write(
        &backup,
        indoc! {r#"
            {
              "groups": {
                "git": {
                  "gs": { "cmd": "git status" },
                  "bad name": { "cmd": "echo nope" },
                  "gl": { "cmd": 42 }
                },
                "docker": "not a group"
              }
            }
        "#},
    )?;

    let restored = store.restore(&backup)?;
    assert_eq!(restored.alias_count(), 1);
    assert_eq!(restored.get("gs", "git"), Some(&AliasEntry::new("git status")));
    assert_eq!(store.load()?, restored);

    Ok(())
}

#[test]
fn invalid_json_is_a_hard_error() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let store = Store::new(fixture.settings());
    fs::write(store.data_file(), "{ not json")?;

    assert!(matches!(store.load(), Err(StoreError::Parse { .. })));

    Ok(())
}

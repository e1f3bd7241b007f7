// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::StoreFixture;

use alias_manager::{
    config::ShellKind,
    import::{imported_count, merge::AliasRef},
    store::Store,
};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;

#[test]
fn import_keeps_first_duplicate_and_is_idempotent() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    fixture.write_shell_config(indoc! {r#"
        # work
        alias gp="git push"
        alias gp="git push origin"
    "#})?;
    let store = Store::new(fixture.settings());

    let imported = store.import_from_file(None)?;
    assert_eq!(imported_count(&imported), 1);

    let report = store.merge_imported_data(&imported)?;
    assert_eq!(
        report.added,
        vec![AliasRef {
            group: "default".into(),
            name: "gp".into()
        }]
    );

    let entry = store.load()?.get("gp", "default").cloned();
    assert_eq!(entry.map(|entry| entry.cmd), Some("git push".into()));
    assert!(fixture.script()?.contains("alias gp='git push'\n"));

    let again = store.merge_imported_data(&imported)?;
    assert!(again.added.is_empty());
    assert_eq!(again.skipped.len(), 1);

    Ok(())
}

#[test]
fn import_sorts_into_marked_groups_and_rejects_reserved() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    fixture.write_shell_config(indoc! {r#"
        export EDITOR=vim

        # ---- Git ----
        # short status
        alias gs='git status -sb'
        alias ls='ls --color'

        # === Docker ===
        alias dps="docker ps"
    "#})?;
    let store = Store::new(fixture.settings());

    let report = store.merge_imported_data(&store.import_from_file(None)?)?;
    assert_eq!(report.added.len(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].alias.name, "ls");

    let document = store.load()?;
    let gs = document.get("gs", "git").cloned();
    assert_eq!(
        gs.and_then(|entry| entry.description),
        Some("short status".into())
    );
    assert!(document.get("dps", "docker").is_some());
    assert!(document.get("ls", "git").is_none());

    Ok(())
}

#[test]
fn import_preview_touches_nothing() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    fixture.write_shell_config("alias ll='ls -la'\n")?;
    let store = Store::new(fixture.settings());

    let imported = store.import_from_file(None)?;
    assert_eq!(imported_count(&imported), 1);
    assert!(!store.data_file().exists());

    Ok(())
}

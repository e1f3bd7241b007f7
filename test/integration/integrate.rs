// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::StoreFixture;

use alias_manager::{
    config::ShellKind,
    integrate::{
        install, repair_shortcut, setup_from_template, uninstall, IntegrationError, Patch,
        BEGIN_MARKER, SHORTCUT_LINE,
    },
};

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn install_then_uninstall_restores_startup_file() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let original = "export EDITOR=vim\n";
    fixture.write_shell_config(original)?;

    let Patch::Applied { backup } = install(fixture.settings())? else {
        anyhow::bail!("expected install to patch startup file");
    };
    assert_eq!(fs::read_to_string(backup)?, original);
    assert!(fixture.shell_config()?.contains(BEGIN_MARKER));
    assert_eq!(install(fixture.settings())?, Patch::Unchanged);

    assert!(matches!(uninstall(fixture.settings())?, Patch::Applied { .. }));
    assert_eq!(fixture.shell_config()?, original);
    assert_eq!(uninstall(fixture.settings())?, Patch::Unchanged);

    Ok(())
}

#[test]
fn install_requires_startup_file() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Bash)?;
    let result = install(fixture.settings());
    assert!(matches!(
        result,
        Err(IntegrationError::ShellConfigMissing { .. })
    ));

    Ok(())
}

#[test]
fn repair_shortcut_rewrites_stale_definition() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    fixture.write_shell_config("alias am=\"node ~/old/index.js\"\n")?;

    assert!(matches!(
        repair_shortcut(fixture.settings())?,
        Patch::Applied { .. }
    ));
    assert_eq!(fixture.shell_config()?, format!("{SHORTCUT_LINE}\n"));
    assert_eq!(repair_shortcut(fixture.settings())?, Patch::Unchanged);

    Ok(())
}

#[test]
fn setup_from_template_backs_up_old_file() -> Result<()> {
    let fixture = StoreFixture::new(ShellKind::Zsh)?;
    let settings = fixture.settings();

    let result = setup_from_template(settings);
    assert!(matches!(result, Err(IntegrationError::TemplateMissing { .. })));

    fixture.write_shell_config("# old\n")?;
    fs::write(&settings.template, "# fresh\n")?;
    let backup = setup_from_template(settings)?;

    assert_eq!(fixture.shell_config()?, "# fresh\n");
    assert_eq!(backup.map(fs::read_to_string).transpose()?, Some("# old\n".into()));

    Ok(())
}

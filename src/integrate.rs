// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell startup file integration.
//!
//! The alias script does nothing until the user's shell sources it. So,
//! alias-manager can patch a small __integration block__ into the shell
//! startup file that sources the alias script whenever it exists.
//!
//! # Integration Block
//!
//! The integration block is bounded by two marker comments, e.g., for zsh:
//!
//! ```text
//! # Alias Manager - Chargement automatique des alias
//! [ -f "/home/user/.local/share/alias-manager/aliases.sh" ] && source "..."
//! # Alias Manager - end
//! ```
//!
//! The begin marker tells whether the block is installed. Both markers bound
//! the region that gets removed on uninstall, so nothing outside of them is
//! ever touched. Startup files patched by older releases only carry the begin
//! marker; for those, the begin marker and the single line below it are
//! removed.
//!
//! Installing twice, or uninstalling twice, changes nothing. Every change to
//! the startup file is preceded by a timestamped backup copy of it.

use crate::{
    atomic::{backup_copy, write_atomic},
    config::{Settings, ShellKind},
};

use regex::Regex;
use std::{
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::{info, instrument};

/// First line of integration block.
pub const BEGIN_MARKER: &str = "# Alias Manager - Chargement automatique des alias";

/// Last line of integration block.
pub const END_MARKER: &str = "# Alias Manager - end";

/// Shortcut alias for alias-manager itself.
pub const SHORTCUT_LINE: &str = "alias am=\"alias-manager\"";

static SHORTCUT_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*alias\s+am=").unwrap());

/// Outcome of patching a shell startup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// File was changed, and a backup was made first.
    Applied { backup: PathBuf },

    /// File already was in the requested state.
    Unchanged,
}

/// Render integration block that sources alias script.
pub fn source_block(shell: ShellKind, script: impl AsRef<Path>) -> String {
    let script = script.as_ref().display();
    let body = match shell {
        ShellKind::Zsh | ShellKind::Bash => {
            format!("[ -f \"{script}\" ] && source \"{script}\"\n")
        }
        ShellKind::Fish => {
            format!("if test -f \"{script}\"\n    source \"{script}\"\nend\n")
        }
    };

    format!("{BEGIN_MARKER}\n{body}{END_MARKER}\n")
}

/// Check if text already holds an integration block.
pub fn is_installed(text: &str) -> bool {
    text.lines().any(|line| line.trim() == BEGIN_MARKER)
}

/// Append integration block to text.
///
/// Returns `None` if text already holds an integration block.
pub fn install_block(text: &str, block: &str) -> Option<String> {
    if is_installed(text) {
        return None;
    }

    let mut out = text.to_string();
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(block);

    Some(out)
}

/// Remove integration block from text.
///
/// Also removes the blank separator line that [`install_block`] puts in front
/// of the block. Returns `None` if text holds no integration block.
pub fn remove_block(text: &str) -> Option<String> {
    let lines = text.lines().collect::<Vec<_>>();
    let begin = lines.iter().position(|line| line.trim() == BEGIN_MARKER)?;

    // INVARIANT: Without an end marker, only the line below the begin marker
    //   belongs to the block.
    let end = lines[begin..]
        .iter()
        .position(|line| line.trim() == END_MARKER)
        .map(|offset| begin + offset)
        .unwrap_or_else(|| (begin + 1).min(lines.len() - 1));

    let start = match begin.checked_sub(1) {
        Some(above) if lines[above].trim().is_empty() => above,
        _ => begin,
    };

    let kept = lines[..start]
        .iter()
        .chain(&lines[end + 1..])
        .copied()
        .collect::<Vec<_>>();

    let mut out = kept.join("\n");
    if !kept.is_empty() && text.ends_with('\n') {
        out.push('\n');
    }

    Some(out)
}

/// Make sure text defines the alias-manager shortcut alias exactly as
/// [`SHORTCUT_LINE`].
///
/// Replaces stale `alias am=` definitions, or appends one if there are none.
/// Returns `None` if text is already correct.
pub fn ensure_shortcut(text: &str) -> Option<String> {
    let mut found = false;
    let mut lines = Vec::new();
    for line in text.lines() {
        if SHORTCUT_ALIAS.is_match(line) {
            found = true;
            lines.push(SHORTCUT_LINE);
        } else {
            lines.push(line);
        }
    }

    if !found {
        let mut out = text.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\n# Alias Manager shortcut\n");
        out.push_str(SHORTCUT_LINE);
        out.push('\n');
        return Some(out);
    }

    let mut out = lines.join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }

    (out != text).then_some(out)
}

/// Install integration block into shell startup file.
///
/// # Errors
///
/// - Return [`IntegrationError::ShellConfigMissing`] if startup file does
///   not exist.
/// - Return [`IntegrationError`] if startup file cannot be backed up or
///   written.
#[instrument(skip(settings), level = "debug")]
pub fn install(settings: &Settings) -> Result<Patch> {
    let block = source_block(settings.shell, &settings.script_file);
    patch_file(&settings.shell_config, |text| install_block(text, &block))
}

/// Remove integration block from shell startup file.
///
/// # Errors
///
/// - Return [`IntegrationError::ShellConfigMissing`] if startup file does
///   not exist.
/// - Return [`IntegrationError`] if startup file cannot be backed up or
///   written.
#[instrument(skip(settings), level = "debug")]
pub fn uninstall(settings: &Settings) -> Result<Patch> {
    patch_file(&settings.shell_config, remove_block)
}

/// Make sure shell startup file carries the shortcut alias.
///
/// # Errors
///
/// - Return [`IntegrationError::ShellConfigMissing`] if startup file does
///   not exist.
/// - Return [`IntegrationError`] if startup file cannot be backed up or
///   written.
#[instrument(skip(settings), level = "debug")]
pub fn repair_shortcut(settings: &Settings) -> Result<Patch> {
    patch_file(&settings.shell_config, ensure_shortcut)
}

/// Replace shell startup file with configured template.
///
/// Returns path to backup of the old startup file, if there was one.
///
/// # Errors
///
/// - Return [`IntegrationError::TemplateMissing`] if template does not exist.
/// - Return [`IntegrationError`] if startup file cannot be backed up or
///   written.
#[instrument(skip(settings), level = "debug")]
pub fn setup_from_template(settings: &Settings) -> Result<Option<PathBuf>> {
    let template = match read_to_string(&settings.template) {
        Ok(template) => template,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(IntegrationError::TemplateMissing {
                path: settings.template.clone(),
            })
        }
        Err(err) => {
            return Err(IntegrationError::Read {
                source: err,
                path: settings.template.clone(),
            })
        }
    };

    let target = &settings.shell_config;
    let backup = if target.exists() {
        Some(backup(target)?)
    } else {
        None
    };

    write_atomic(target, template).map_err(|err| IntegrationError::Write {
        source: err,
        path: target.clone(),
    })?;
    info!("restored {:?} from {:?}", target.display(), settings.template.display());

    Ok(backup)
}

/// Render installation instructions for current settings.
pub fn setup_info(settings: &Settings) -> String {
    let block = source_block(settings.shell, &settings.script_file);
    format!(
        "\
Alias Manager installation

1. Integrate with your {shell} startup file ({config}):
   alias-manager install

   This appends the following block:

{block}
2. Reload your shell:
   source {config}

3. Try it:
   alias-manager add gs \"git status\" --group git

Files:
   alias document: {data}
   alias script:   {script}

Uninstall:
   alias-manager uninstall
   rm {data} {script}
",
        shell = settings.shell,
        config = settings.shell_config.display(),
        data = settings.data_file.display(),
        script = settings.script_file.display(),
        block = block
            .lines()
            .map(|line| format!("   {line}\n"))
            .collect::<String>(),
    )
}

/// Read file, transform it, and write it back if the transform asks for it.
///
/// The file is backed up before it is written.
fn patch_file<F>(path: &Path, transform: F) -> Result<Patch>
where
    F: FnOnce(&str) -> Option<String>,
{
    let text = match read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(IntegrationError::ShellConfigMissing {
                path: path.to_path_buf(),
            })
        }
        Err(err) => {
            return Err(IntegrationError::Read {
                source: err,
                path: path.to_path_buf(),
            })
        }
    };

    let Some(patched) = transform(&text) else {
        return Ok(Patch::Unchanged);
    };

    let backup = backup(path)?;
    write_atomic(path, patched).map_err(|err| IntegrationError::Write {
        source: err,
        path: path.to_path_buf(),
    })?;

    Ok(Patch::Applied { backup })
}

fn backup(path: &Path) -> Result<PathBuf> {
    backup_copy(path).map_err(|err| IntegrationError::Backup {
        source: err,
        path: path.to_path_buf(),
    })
}

/// Shell integration error types.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// Shell startup file does not exist.
    #[error("shell startup file {:?} does not exist", path.display())]
    ShellConfigMissing { path: PathBuf },

    /// Shell startup file template does not exist.
    #[error("shell startup template {:?} does not exist", path.display())]
    TemplateMissing { path: PathBuf },

    /// File cannot be read.
    #[error("failed to read {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be backed up.
    #[error("failed to back up {:?}", path.display())]
    Backup {
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
}

/// Friendly result alias :3
pub type Result<T, E = IntegrationError> = std::result::Result<T, E>;

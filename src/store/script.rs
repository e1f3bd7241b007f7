// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias script rendering.
//!
//! The alias script is the shell file that the user's startup file sources.
//! It is derived from the alias document in full every time the document
//! changes, and holds no state of its own.
//!
//! # Script Layout
//!
//! Groups are written in sorted order, each under a comment header that names
//! the group. Enabled aliases follow their header in sorted order, one
//! `alias <name>='<cmd>'` statement per line. Disabled aliases are left out
//! entirely.

use crate::document::AliasDocument;

/// First lines of every alias script.
pub const SCRIPT_HEADER: &str = "\
# Generated by alias-manager. Do not edit by hand.
# Changes are overwritten every time the alias document changes.
";

/// Render alias script from alias document.
///
/// Output is deterministic for a given document.
pub fn render(document: &AliasDocument) -> String {
    let mut out = String::from(SCRIPT_HEADER);

    for (group_name, aliases) in &document.groups {
        out.push('\n');
        out.push_str(&format!("# {group_name}\n"));
        for (alias_name, entry) in aliases.iter().filter(|(_, entry)| !entry.disabled) {
            out.push_str(&format!("alias {alias_name}={}\n", single_quote(&entry.cmd)));
        }
    }

    out
}

/// Wrap text in single quotes for POSIX shells and fish.
///
/// Embedded single quotes are closed, escaped, and reopened.
fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

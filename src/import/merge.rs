// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Merge imported aliases into an alias document.
//!
//! Merging is additive only. An imported alias never replaces an alias of the
//! same name in the same group, so running the same import again is harmless.

use crate::{
    document::{AliasDocument, AliasEntry},
    import::ImportedGroups,
    validate::{validate_new_alias, ValidationError},
};

use tracing::debug;

/// Location of an alias inside the alias document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRef {
    pub group: String,
    pub name: String,
}

impl AliasRef {
    fn new(group: &str, name: &str) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

/// Imported alias that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub alias: AliasRef,
    pub error: ValidationError,
}

/// Outcome of a merge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Aliases inserted into the document.
    pub added: Vec<AliasRef>,

    /// Aliases left alone because the group already had that name.
    pub skipped: Vec<AliasRef>,

    /// Aliases refused by validation, e.g., reserved system commands.
    pub rejected: Vec<Rejection>,
}

impl MergeReport {
    /// Check if merge changed the document.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Merge imported aliases into alias document.
///
/// Existing aliases win over imported ones. Imported aliases must pass the
/// same checks as aliases added by hand. Missing groups are created on their
/// first insertion.
pub fn merge(document: &mut AliasDocument, imported: &ImportedGroups) -> MergeReport {
    let mut report = MergeReport::default();

    for (group_name, aliases) in imported {
        for (alias_name, alias) in aliases {
            let alias_ref = AliasRef::new(group_name, alias_name);

            if document.get(alias_name, group_name).is_some() {
                debug!("skip {alias_name:?} in {group_name:?}: already exists");
                report.skipped.push(alias_ref);
                continue;
            }

            if let Err(error) = validate_new_alias(alias_name, &alias.cmd, group_name) {
                debug!("reject {alias_name:?} in {group_name:?}: {error}");
                report.rejected.push(Rejection {
                    alias: alias_ref,
                    error,
                });
                continue;
            }

            document
                .groups
                .entry(group_name.clone())
                .or_default()
                .insert(
                    alias_name.clone(),
                    AliasEntry::new(alias.cmd.clone()).with_description(alias.description.clone()),
                );
            report.added.push(alias_ref);
        }
    }

    report
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias document layout.
//!
//! All aliases that alias-manager keeps track of live inside of one JSON
//! document called the __alias document__. The alias document is the single
//! source of truth. The alias script that the user's shell sources is always
//! derived from it, and never edited by hand.
//!
//! # General Layout
//!
//! ```json
//! {
//!   "groups": {
//!     "git": {
//!       "gs": { "cmd": "git status", "disabled": false }
//!     }
//!   }
//! }
//! ```
//!
//! Aliases are sorted into __groups__. The "default" group is special: it is
//! always considered to exist, and is never removed, even when empty.
//!
//! # Lenient Decoding
//!
//! The alias document may be hand edited, restored from an old backup, or
//! pulled in from another machine. Thus, decoding never trusts the shape of
//! the incoming data. Anything that does not fit the layout is dropped field
//! by field rather than failing the whole document. Only invalid JSON syntax
//! is treated as a hard failure. File I/O is left to the caller.

use crate::validate::{
    validate_alias_name, validate_command, validate_group_name, validate_new_alias,
    ValidationError,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};
use tracing::warn;

/// Name of group that always exists.
pub const DEFAULT_GROUP: &str = "default";

/// Aliases of a group keyed by alias name.
pub type AliasGroup = BTreeMap<String, AliasEntry>;

/// Root of persisted alias data.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct AliasDocument {
    /// Alias groups keyed by group name.
    pub groups: BTreeMap<String, AliasGroup>,
}

impl Default for AliasDocument {
    fn default() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(DEFAULT_GROUP.into(), AliasGroup::new());
        Self { groups }
    }
}

/// Single alias entry.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct AliasEntry {
    /// Literal shell command body.
    pub cmd: String,

    /// Disabled aliases stay in the document, but are left out of the alias
    /// script.
    #[serde(default)]
    pub disabled: bool,

    /// Free text description, mostly set by imports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AliasEntry {
    /// Construct new enabled alias entry.
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            disabled: false,
            description: None,
        }
    }

    /// Attach description to alias entry.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Active and total alias counts of a group.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GroupSummary {
    pub name: String,
    pub active: usize,
    pub total: usize,
}

impl AliasDocument {
    /// Decode alias document from arbitrary JSON value.
    ///
    /// Never fails. Repairs the incoming value into the smallest valid alias
    /// document it can find:
    ///
    /// - A root that is not an object yields a fresh document.
    /// - Groups that are not objects, or whose names are invalid, are dropped.
    /// - Entries that are not objects, lack a string "cmd", or whose name or
    ///   command is invalid, are dropped.
    /// - A missing or non-boolean "disabled" field becomes `false`.
    /// - A non-string "description" field is dropped.
    /// - The "default" group is always present afterwards.
    pub fn from_value(value: Value) -> Self {
        let mut document = Self::default();

        let groups = match value {
            Value::Object(mut root) => match root.remove("groups") {
                Some(Value::Object(groups)) => groups,
                Some(_) => {
                    warn!("alias document \"groups\" is not an object, starting fresh");
                    return document;
                }
                None => {
                    warn!("alias document has no \"groups\", starting fresh");
                    return document;
                }
            },
            _ => {
                warn!("alias document root is not an object, starting fresh");
                return document;
            }
        };

        for (group_name, group) in groups {
            if let Err(error) = validate_group_name(&group_name) {
                warn!("drop group: {error}");
                continue;
            }

            let Value::Object(entries) = group else {
                warn!("drop group {group_name:?}: not an object");
                continue;
            };

            let group = document.groups.entry(group_name.clone()).or_default();
            for (alias_name, entry) in entries {
                match decode_entry(&alias_name, entry) {
                    Some(entry) => {
                        group.insert(alias_name, entry);
                    }
                    None => warn!("drop alias {alias_name:?} from group {group_name:?}"),
                }
            }
        }

        document
    }

    /// Check that document only holds valid names and commands.
    ///
    /// # Errors
    ///
    /// - Return first [`ValidationError`] encountered.
    pub fn check(&self) -> Result<(), ValidationError> {
        for (group_name, group) in &self.groups {
            validate_group_name(group_name)?;
            for (alias_name, entry) in group {
                validate_alias_name(alias_name)?;
                validate_command(&entry.cmd)?;
            }
        }

        Ok(())
    }

    /// Add a new alias to a group.
    ///
    /// Creates the group if it does not exist yet.
    ///
    /// # Errors
    ///
    /// - Return [`DocumentError::Validation`] if name, command, or group are
    ///   invalid, or if the name is a reserved system command.
    /// - Return [`DocumentError::AlreadyExists`] if alias is already in group.
    pub fn add_alias(&mut self, name: &str, command: &str, group: &str) -> Result<()> {
        validate_new_alias(name, command, group)?;

        if self.get(name, group).is_some() {
            return Err(DocumentError::AlreadyExists {
                name: name.into(),
                group: group.into(),
            });
        }

        self.groups
            .entry(group.into())
            .or_default()
            .insert(name.into(), AliasEntry::new(command));

        Ok(())
    }

    /// Remove alias from a group.
    ///
    /// A group left empty is removed as well, unless it is the default group.
    ///
    /// # Errors
    ///
    /// - Return [`DocumentError::Validation`] if name or group are invalid.
    /// - Return [`DocumentError::AliasNotFound`] if alias is not in group.
    pub fn remove_alias(&mut self, name: &str, group: &str) -> Result<AliasEntry> {
        validate_alias_name(name)?;
        validate_group_name(group)?;

        let aliases = self
            .groups
            .get_mut(group)
            .ok_or_else(|| alias_not_found(name, group))?;
        let entry = aliases
            .remove(name)
            .ok_or_else(|| alias_not_found(name, group))?;

        if aliases.is_empty() && group != DEFAULT_GROUP {
            self.groups.remove(group);
        }

        Ok(entry)
    }

    /// Set disabled state of one alias.
    ///
    /// Returns `false` if the alias was already in the requested state.
    ///
    /// # Errors
    ///
    /// - Return [`DocumentError::Validation`] if name or group are invalid.
    /// - Return [`DocumentError::AliasNotFound`] if alias is not in group.
    pub fn set_alias_disabled(&mut self, name: &str, group: &str, disabled: bool) -> Result<bool> {
        validate_alias_name(name)?;
        validate_group_name(group)?;

        let entry = self
            .groups
            .get_mut(group)
            .and_then(|aliases| aliases.get_mut(name))
            .ok_or_else(|| alias_not_found(name, group))?;

        if entry.disabled == disabled {
            return Ok(false);
        }

        entry.disabled = disabled;
        Ok(true)
    }

    /// Set disabled state of every alias in a group.
    ///
    /// Returns number of aliases whose state actually changed.
    ///
    /// # Errors
    ///
    /// - Return [`DocumentError::Validation`] if group is invalid.
    /// - Return [`DocumentError::GroupNotFound`] if group does not exist.
    pub fn set_group_disabled(&mut self, group: &str, disabled: bool) -> Result<usize> {
        validate_group_name(group)?;

        let aliases = self
            .groups
            .get_mut(group)
            .ok_or_else(|| DocumentError::GroupNotFound {
                group: group.into(),
            })?;

        let mut count = 0;
        for entry in aliases.values_mut().filter(|entry| entry.disabled != disabled) {
            entry.disabled = disabled;
            count += 1;
        }

        Ok(count)
    }

    /// Lookup alias in group.
    pub fn get(&self, name: &str, group: &str) -> Option<&AliasEntry> {
        self.groups.get(group).and_then(|aliases| aliases.get(name))
    }

    /// Lookup group, treating the default group as always present.
    ///
    /// # Errors
    ///
    /// - Return [`DocumentError::GroupNotFound`] if group does not exist.
    pub fn group(&self, group: &str) -> Result<&AliasGroup> {
        static EMPTY: AliasGroup = AliasGroup::new();
        match self.groups.get(group) {
            Some(aliases) => Ok(aliases),
            None if group == DEFAULT_GROUP => Ok(&EMPTY),
            None => Err(DocumentError::GroupNotFound {
                group: group.into(),
            }),
        }
    }

    /// Summarize every group in sorted order.
    pub fn group_summaries(&self) -> Vec<GroupSummary> {
        self.groups
            .iter()
            .map(|(name, aliases)| GroupSummary {
                name: name.clone(),
                active: aliases.values().filter(|entry| !entry.disabled).count(),
                total: aliases.len(),
            })
            .collect()
    }

    /// Total number of aliases across all groups.
    pub fn alias_count(&self) -> usize {
        self.groups.values().map(AliasGroup::len).sum()
    }
}

impl FromStr for AliasDocument {
    type Err = serde_json::Error;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(data)?;
        Ok(Self::from_value(value))
    }
}

impl Display for AliasDocument {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            serde_json::to_string_pretty(self)
                .map_err(|_| FmtError)?
                .as_str(),
        )
    }
}

fn decode_entry(name: &str, entry: Value) -> Option<AliasEntry> {
    if validate_alias_name(name).is_err() {
        return None;
    }

    let Value::Object(mut fields) = entry else {
        return None;
    };

    let cmd = match fields.remove("cmd") {
        Some(Value::String(cmd)) if validate_command(&cmd).is_ok() => cmd,
        _ => return None,
    };

    Some(AliasEntry {
        cmd,
        disabled: take_bool(&mut fields, "disabled"),
        description: match fields.remove("description") {
            Some(Value::String(description)) => Some(description),
            _ => None,
        },
    })
}

fn take_bool(fields: &mut Map<String, Value>, key: &str) -> bool {
    matches!(fields.remove(key), Some(Value::Bool(true)))
}

fn alias_not_found(name: &str, group: &str) -> DocumentError {
    DocumentError::AliasNotFound {
        name: name.into(),
        group: group.into(),
    }
}

/// Alias document manipulation error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Name, command, or group failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Alias does not exist in target group.
    #[error("alias {name:?} does not exist in group {group:?}")]
    AliasNotFound { name: String, group: String },

    /// Group does not exist.
    #[error("group {group:?} does not exist")]
    GroupNotFound { group: String },

    /// Alias already exists in target group.
    #[error("alias {name:?} already exists in group {group:?}")]
    AlreadyExists { name: String, group: String },
}

/// Friendly result alias :3
pub type Result<T, E = DocumentError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn git_document() -> AliasDocument {
        let mut document = AliasDocument::default();
        document.add_alias("gs", "git status", "git").unwrap();
        document.add_alias("gp", "git push", "git").unwrap();
        document
    }

    #[test]
    fn add_alias_creates_group() -> anyhow::Result<()> {
        let mut document = AliasDocument::default();
        document.add_alias("gs", "git status", "git")?;

        let result = serde_json::to_value(&document)?;
        let expect = json!({
            "groups": {
                "default": {},
                "git": { "gs": { "cmd": "git status", "disabled": false } }
            }
        });
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn add_alias_rejects_duplicate() {
        let mut document = git_document();
        let result = document.add_alias("gs", "git stash", "git");
        assert_eq!(
            result,
            Err(DocumentError::AlreadyExists {
                name: "gs".into(),
                group: "git".into()
            })
        );
        assert_eq!(document.get("gs", "git").unwrap().cmd, "git status");
    }

    #[test]
    fn add_alias_rejects_reserved_name_without_mutation() {
        let mut document = AliasDocument::default();
        let result = document.add_alias("ls", "ls -la", DEFAULT_GROUP);
        assert_eq!(
            result,
            Err(DocumentError::Validation(ValidationError::ReservedName {
                name: "ls".into()
            }))
        );
        assert_eq!(document, AliasDocument::default());
    }

    #[test]
    fn remove_last_alias_drops_group() -> anyhow::Result<()> {
        let mut document = AliasDocument::default();
        document.add_alias("tmp", "echo tmp", "temp")?;
        document.remove_alias("tmp", "temp")?;
        assert!(!document.groups.contains_key("temp"));

        Ok(())
    }

    #[test]
    fn remove_last_alias_keeps_default_group() -> anyhow::Result<()> {
        let mut document = AliasDocument::default();
        document.add_alias("serve", "php -S localhost:8000", DEFAULT_GROUP)?;
        document.remove_alias("serve", DEFAULT_GROUP)?;
        assert_eq!(document.groups.get(DEFAULT_GROUP), Some(&AliasGroup::new()));

        Ok(())
    }

    #[test]
    fn remove_missing_alias() {
        let mut document = git_document();
        assert_eq!(
            document.remove_alias("gl", "git"),
            Err(DocumentError::AliasNotFound {
                name: "gl".into(),
                group: "git".into()
            })
        );
        assert_eq!(
            document.remove_alias("gs", "nope"),
            Err(DocumentError::AliasNotFound {
                name: "gs".into(),
                group: "nope".into()
            })
        );
    }

    #[test]
    fn set_alias_disabled_reports_change() -> anyhow::Result<()> {
        let mut document = git_document();
        assert!(document.set_alias_disabled("gs", "git", true)?);
        assert!(!document.set_alias_disabled("gs", "git", true)?);
        assert!(document.get("gs", "git").unwrap().disabled);
        assert!(document.set_alias_disabled("gs", "git", false)?);

        Ok(())
    }

    #[test]
    fn set_group_disabled_counts_changes() -> anyhow::Result<()> {
        let mut document = git_document();
        document.set_alias_disabled("gs", "git", true)?;
        assert_eq!(document.set_group_disabled("git", true)?, 1);
        assert_eq!(document.set_group_disabled("git", true)?, 0);
        assert_eq!(document.set_group_disabled("git", false)?, 2);
        assert_eq!(
            document.set_group_disabled("docker", true),
            Err(DocumentError::GroupNotFound {
                group: "docker".into()
            })
        );

        Ok(())
    }

    #[test]
    fn group_summaries_sorted() -> anyhow::Result<()> {
        let mut document = git_document();
        document.set_alias_disabled("gp", "git", true)?;

        let expect = vec![
            GroupSummary {
                name: "default".into(),
                active: 0,
                total: 0,
            },
            GroupSummary {
                name: "git".into(),
                active: 1,
                total: 2,
            },
        ];
        assert_eq!(document.group_summaries(), expect);

        Ok(())
    }

    #[test]
    fn from_value_repairs_shape() {
        let result = AliasDocument::from_value(json!({
            "groups": {
                "git": {
                    "gs": { "cmd": "git status" },
                    "gp": { "cmd": "git push", "disabled": true, "description": 5 },
                    "gl": { "disabled": true },
                    "gd": "git diff",
                    "1bad": { "cmd": "nope" },
                    "gb": { "cmd": "   " }
                },
                "broken": ["not", "a", "group"],
                "bad group": { "x": { "cmd": "x" } }
            }
        }));

        let mut expect = AliasDocument::default();
        let mut git = AliasGroup::new();
        git.insert("gs".into(), AliasEntry::new("git status"));
        git.insert(
            "gp".into(),
            AliasEntry {
                cmd: "git push".into(),
                disabled: true,
                description: None,
            },
        );
        expect.groups.insert("git".into(), git);

        assert_eq!(result, expect);
    }

    #[test]
    fn from_value_non_object_root() {
        assert_eq!(AliasDocument::from_value(json!([1, 2, 3])), AliasDocument::default());
        assert_eq!(AliasDocument::from_value(json!({})), AliasDocument::default());
        assert_eq!(
            AliasDocument::from_value(json!({ "groups": "nope" })),
            AliasDocument::default()
        );
    }

    #[test]
    fn from_str_rejects_bad_syntax() {
        assert!("{ \"groups\": ".parse::<AliasDocument>().is_err());
    }

    #[test]
    fn display_then_parse_round_trip() -> anyhow::Result<()> {
        let mut document = git_document();
        document.set_alias_disabled("gp", "git", true)?;
        document.groups.get_mut("git").unwrap().insert(
            "gl".into(),
            AliasEntry::new("git log --oneline").with_description("short log"),
        );

        let result: AliasDocument = document.to_string().parse()?;
        assert_eq!(result, document);

        Ok(())
    }
}

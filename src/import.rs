// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Import of existing shell aliases.
//!
//! Users usually show up with a startup file full of hand written aliases.
//! The import parser scans that file for `alias name=value` statements, and
//! sorts them into groups so that they can be merged into the alias document.
//!
//! # Import Format
//!
//! The parser is best effort, it is not a shell parser. It reads the file one
//! line at a time, and understands three kinds of lines:
//!
//! 1. __Alias statements__: `alias <name>=<value>` where the value is
//!    single quoted, double quoted, or bare. Leading flags such as
//!    `alias -g` are ignored.
//! 2. __Group markers__: a comment whose text is wrapped in runs of two or more
//!    dashes or equal signs, e.g., `# ---- git ----` or `# === Docker ===`.
//!    Every alias statement after a group marker belongs to that group until
//!    the next marker shows up. Alias statements before any marker belong to
//!    the "default" group.
//! 3. __Comments__: a plain comment directly above an alias statement becomes
//!    the description of that alias.
//!
//! Anything else is ignored. Malformed alias statements are skipped instead of
//! failing the import. The first definition of a name in a group wins.
//!
//! # See Also
//!
//! - [`merge`]

pub mod merge;

use crate::{
    document::DEFAULT_GROUP,
    validate::{validate_alias_name, MAX_GROUP_NAME_LEN},
};

use regex::Regex;
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::{debug, instrument};

/// Description given to imported aliases without a comment above them.
pub const DEFAULT_DESCRIPTION: &str = "Alias importé depuis .zshrc";

static ALIAS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*alias\s+(?:-\w+\s+)*([^=\s]*)=(.*)$").unwrap());

static GROUP_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*[-=]{2,}\s*([^-=\s](?:.*[^-=\s])?)\s*[-=]{2,}\s*$").unwrap()
});

static COMMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#+\s*(.*?)\s*$").unwrap());

/// Alias found by the import parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedAlias {
    pub cmd: String,
    pub description: String,
}

impl ImportedAlias {
    /// Check if description came from the file rather than the fallback.
    pub fn has_custom_description(&self) -> bool {
        self.description != DEFAULT_DESCRIPTION
    }
}

/// Imported aliases keyed by group name, then alias name.
pub type ImportedGroups = BTreeMap<String, BTreeMap<String, ImportedAlias>>;

/// Parse alias statements out of shell configuration text.
///
/// Never fails, see module documentation for accepted format.
pub fn parse(content: &str) -> ImportedGroups {
    let mut groups = ImportedGroups::new();
    let mut group = DEFAULT_GROUP.to_string();
    let mut description: Option<String> = None;

    for (number, line) in content.lines().enumerate() {
        let number = number + 1;

        if let Some(caps) = GROUP_MARKER.captures(line) {
            group = normalize_group_name(&caps[1]);
            description = None;
            continue;
        }

        if let Some(caps) = COMMENT_LINE.captures(line) {
            let text = &caps[1];
            description = (!text.is_empty()).then(|| text.to_string());
            continue;
        }

        let Some(caps) = ALIAS_LINE.captures(line) else {
            description = None;
            continue;
        };

        // INVARIANT: Description only applies to the statement right below it.
        let pending = description.take();
        let name = &caps[1];
        if let Err(error) = validate_alias_name(name) {
            debug!("skip line {number}: {error}");
            continue;
        }

        let Some(cmd) = unquote(&caps[2]) else {
            debug!("skip line {number}: alias {name:?} has empty value");
            continue;
        };

        let aliases = groups.entry(group.clone()).or_default();
        if aliases.contains_key(name) {
            debug!("skip line {number}: alias {name:?} already defined in group {group:?}");
            continue;
        }

        aliases.insert(
            name.to_string(),
            ImportedAlias {
                cmd,
                description: pending.unwrap_or_else(|| DEFAULT_DESCRIPTION.into()),
            },
        );
    }

    groups
}

/// Read shell configuration file, and parse its alias statements.
///
/// # Errors
///
/// - Return [`ImportError::Read`] if file cannot be read.
#[instrument(skip(path), level = "debug")]
pub fn parse_file(path: impl AsRef<Path>) -> Result<ImportedGroups> {
    let content = read_to_string(path.as_ref()).map_err(|err| ImportError::Read {
        source: err,
        path: path.as_ref().to_path_buf(),
    })?;

    Ok(parse(&content))
}

/// Count every alias across all imported groups.
pub fn imported_count(groups: &ImportedGroups) -> usize {
    groups.values().map(BTreeMap::len).sum()
}

/// Turn free text of a group marker into a valid group name.
fn normalize_group_name(text: &str) -> String {
    let name = text
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(MAX_GROUP_NAME_LEN)
        .collect::<String>();

    if name.is_empty() {
        DEFAULT_GROUP.into()
    } else {
        name
    }
}

/// Read raw alias value as one shell word, and strip its quoting.
///
/// Single quoted parts are literal. Double quoted parts only treat `\"`,
/// `\\`, `\$`, and `` \` `` as escapes. Bare parts drop the backslash in
/// front of any character. Adjacent parts are joined, and the word ends at
/// the first unquoted whitespace, which also cuts off trailing comments. An
/// unterminated quote runs to the end of the line.
///
/// Returns `None` for values that end up blank.
fn unquote(raw: &str) -> Option<String> {
    let mut value = String::new();
    let mut chars = raw.trim_start().chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => break,
            '\'' => value.extend(chars.by_ref().take_while(|c| *c != '\'')),
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(escaped @ ('"' | '\\' | '$' | '`')) => value.push(escaped),
                            Some(other) => {
                                value.push('\\');
                                value.push(other);
                            }
                            None => value.push('\\'),
                        },
                        _ => value.push(c),
                    }
                }
            }
            '\\' => value.push(chars.next().unwrap_or('\\')),
            _ => value.push(c),
        }
    }

    (!value.trim().is_empty()).then_some(value)
}

/// Alias import error types.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Shell configuration file cannot be read.
    #[error("failed to read aliases from {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ImportError> = std::result::Result<T, E>;

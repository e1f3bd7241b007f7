// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias, command, and group validation.
//!
//! Every name that ends up in the alias document, or in the generated alias
//! script, must pass through these checks first. All checks are pure, and
//! report the first rule that the given input breaks.
//!
//! # Naming Rules
//!
//! Alias names and group names share the same character set,
//! `[A-Za-z0-9_-]`, but differ in two ways. Alias names are capped at 50
//! characters and may not start with a digit, because the shell will not
//! accept them as alias names. Group names are capped at 30 characters, and
//! may start with a digit, because they only ever appear inside comments of
//! the generated alias script.

/// Longest alias name allowed.
pub const MAX_ALIAS_NAME_LEN: usize = 50;

/// Longest command body allowed.
pub const MAX_COMMAND_LEN: usize = 1000;

/// Longest group name allowed.
pub const MAX_GROUP_NAME_LEN: usize = 30;

/// Standard commands that an alias is not allowed to shadow.
pub const RESERVED_COMMANDS: &[&str] = &[
    "cd", "ls", "cp", "mv", "rm", "mkdir", "rmdir", "pwd", "cat", "less", "more", "grep", "find",
    "sort", "uniq", "head", "tail", "wc", "diff", "tar", "gzip", "chmod", "chown", "ps", "kill",
    "killall", "sudo", "su", "which", "whereis", "man", "history", "export", "env", "date", "cal",
    "who", "whoami", "id", "mount", "umount", "df", "du", "free", "top", "htop", "ssh", "scp",
    "rsync", "curl", "wget", "ping", "traceroute", "netstat", "ifconfig", "iptables", "systemctl",
    "service", "crontab", "at", "jobs", "bg", "fg", "nohup",
];

/// Validate syntax of an alias name.
///
/// # Errors
///
/// - Return [`ValidationError::InvalidName`] if name is empty, too long,
///   starts with a digit, or uses characters outside of `[A-Za-z0-9_-]`.
pub fn validate_alias_name(name: &str) -> Result<()> {
    let invalid = |reason: &'static str| ValidationError::InvalidName {
        name: name.into(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("alias name cannot be empty"));
    }

    if !name.chars().all(is_name_char) {
        return Err(invalid(
            "alias name may only contain letters, digits, dashes, and underscores",
        ));
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid("alias name cannot start with a digit"));
    }

    if name.chars().count() > MAX_ALIAS_NAME_LEN {
        return Err(invalid("alias name cannot exceed 50 characters"));
    }

    Ok(())
}

/// Validate command body of an alias.
///
/// # Errors
///
/// - Return [`ValidationError::InvalidCommand`] if command is blank or too
///   long.
pub fn validate_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        return Err(ValidationError::InvalidCommand {
            reason: "command cannot be empty",
        });
    }

    if command.chars().count() > MAX_COMMAND_LEN {
        return Err(ValidationError::InvalidCommand {
            reason: "command cannot exceed 1000 characters",
        });
    }

    Ok(())
}

/// Validate syntax of a group name.
///
/// Unlike alias names, group names may start with a digit.
///
/// # Errors
///
/// - Return [`ValidationError::InvalidGroup`] if group name is empty, too
///   long, or uses characters outside of `[A-Za-z0-9_-]`.
pub fn validate_group_name(group: &str) -> Result<()> {
    let invalid = |reason: &'static str| ValidationError::InvalidGroup {
        group: group.into(),
        reason,
    };

    if group.is_empty() {
        return Err(invalid("group name cannot be empty"));
    }

    if !group.chars().all(is_name_char) {
        return Err(invalid(
            "group name may only contain letters, digits, dashes, and underscores",
        ));
    }

    if group.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(invalid("group name cannot exceed 30 characters"));
    }

    Ok(())
}

/// Make sure alias name does not shadow a standard system command.
///
/// # Errors
///
/// - Return [`ValidationError::ReservedName`] if name is a reserved command.
pub fn check_system_command_conflict(name: &str) -> Result<()> {
    if RESERVED_COMMANDS.contains(&name) {
        return Err(ValidationError::ReservedName { name: name.into() });
    }

    Ok(())
}

/// Run every check that a brand new alias must pass.
///
/// # Errors
///
/// - Return first [`ValidationError`] encountered.
pub fn validate_new_alias(name: &str, command: &str, group: &str) -> Result<()> {
    validate_alias_name(name)?;
    validate_command(command)?;
    validate_group_name(group)?;
    check_system_command_conflict(name)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validation error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Alias name breaks naming rules.
    #[error("invalid alias name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Command body breaks command rules.
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: &'static str },

    /// Group name breaks naming rules.
    #[error("invalid group name {group:?}: {reason}")]
    InvalidGroup { group: String, reason: &'static str },

    /// Alias name would shadow a standard system command.
    #[error("{name:?} is a critical system command, choose another alias name")]
    ReservedName { name: String },
}

/// Friendly result alias :3
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

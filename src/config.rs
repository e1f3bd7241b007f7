// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Alias-manager works with a handful of files: the alias document, the alias
//! script, the shell startup file, a startup file template, and an optional
//! Git work tree for syncing. Their locations are resolved exactly once at
//! start up into [`Settings`], which is then handed by reference to every
//! component that touches the file system.
//!
//! # Configuration File
//!
//! All settings are optional. A missing configuration file simply means that
//! every default is used.
//!
//! ```toml
//! data_file = "~/.alias-manager/aliases.json"
//! script_file = "~/.alias-manager/aliases.sh"
//! shell = "zsh"
//! shell_config = "$HOME/.zshrc"
//! template = "~/dotfiles/zshrc-template"
//!
//! [sync]
//! repo_dir = "~/dotfiles"
//! file = "aliases.json"
//! auto_push = true
//! ```
//!
//! Every path goes through shell expansion, so `~` and environment variables
//! are allowed.

use crate::path::{default_config_dir, default_config_file, default_data_dir, home_dir, NoWayHome};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Raw configuration file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to alias document.
    pub data_file: Option<String>,

    /// Path to generated alias script.
    pub script_file: Option<String>,

    /// Shell to integrate with.
    pub shell: Option<ShellKind>,

    /// Path to shell startup file.
    pub shell_config: Option<String>,

    /// Path to shell startup file template.
    pub template: Option<String>,

    /// Git synchronization settings.
    pub sync: Option<SyncConfig>,
}

/// Raw Git synchronization layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Git work tree that holds the sync file.
    pub repo_dir: String,

    /// Sync file name relative to work tree.
    pub file: Option<String>,

    /// Commit and push sync file after every change.
    #[serde(default)]
    pub auto_push: bool,
}

impl FromStr for ConfigFile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: ConfigFile = toml::de::from_str(data)?;

        // INVARIANT: Perform shell expansion on every path field.
        for path in [
            &mut config.data_file,
            &mut config.script_file,
            &mut config.shell_config,
            &mut config.template,
        ]
        .into_iter()
        .flatten()
        {
            *path = expand(path)?;
        }

        if let Some(sync) = config.sync.as_mut() {
            sync.repo_dir = expand(&sync.repo_dir)?;
        }

        Ok(config)
    }
}

fn expand(path: &str) -> Result<String> {
    Ok(shellexpand::full(path)?.into_owned())
}

/// Supported shells.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    #[default]
    Zsh,
    Bash,
    Fish,
}

impl ShellKind {
    /// Detect shell from path of shell binary, e.g., `$SHELL`.
    pub fn from_shell_path(shell: &str) -> Option<Self> {
        let name = Path::new(shell).file_name()?.to_string_lossy();
        match name.as_ref() {
            "zsh" => Some(Self::Zsh),
            "bash" => Some(Self::Bash),
            "fish" => Some(Self::Fish),
            _ => None,
        }
    }

    /// Detect shell through `$SHELL`, falling back to zsh.
    pub fn detect() -> Self {
        std::env::var("SHELL")
            .ok()
            .and_then(|shell| Self::from_shell_path(&shell))
            .unwrap_or_default()
    }

    /// Default startup file of shell relative to home directory.
    pub fn startup_file(&self, home: impl AsRef<Path>) -> PathBuf {
        let home = home.as_ref();
        match self {
            Self::Zsh => home.join(".zshrc"),
            Self::Bash => home.join(".bashrc"),
            Self::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }
}

impl Display for ShellKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(match self {
            Self::Zsh => "zsh",
            Self::Bash => "bash",
            Self::Fish => "fish",
        })
    }
}

/// Fully resolved settings.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Settings {
    /// Path to alias document.
    pub data_file: PathBuf,

    /// Path to generated alias script.
    pub script_file: PathBuf,

    /// Shell to integrate with.
    pub shell: ShellKind,

    /// Path to shell startup file.
    pub shell_config: PathBuf,

    /// Path to shell startup file template.
    pub template: PathBuf,

    /// Git synchronization settings, if any.
    pub sync: Option<SyncSettings>,
}

/// Fully resolved Git synchronization settings.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SyncSettings {
    /// Git work tree that holds the sync file.
    pub repo_dir: PathBuf,

    /// Absolute path to sync file inside of work tree.
    pub sync_file: PathBuf,

    /// Commit and push sync file after every change.
    pub auto_push: bool,
}

impl Settings {
    /// Default sync file name.
    pub const SYNC_FILE: &'static str = "aliases.json";

    /// Load settings from configuration file.
    ///
    /// Uses default configuration file path if none is given. A missing
    /// default configuration file is not an error, but a missing explicit one
    /// is.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if configuration file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if configuration file is invalid.
    /// - Return [`ConfigError::ShellExpansion`] if a path cannot be expanded.
    /// - Return [`ConfigError::NoWayHome`] if home directory is unknown.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_config_file()?, false),
        };

        let config = match read_to_string(&path) {
            Ok(data) => data.parse()?,
            Err(err) if err.kind() == ErrorKind::NotFound && !explicit => {
                debug!("no configuration file at {:?}, using defaults", path.display());
                ConfigFile::default()
            }
            Err(err) => return Err(ConfigError::Read { source: err, path }),
        };

        Self::resolve(config, ShellKind::detect())
    }

    /// Resolve raw configuration into settings by filling in defaults.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::NoWayHome`] if home directory is unknown.
    pub fn resolve(config: ConfigFile, detected: ShellKind) -> Result<Self> {
        let data_dir = default_data_dir()?;
        let shell = config.shell.unwrap_or(detected);

        let shell_config = match config.shell_config {
            Some(path) => PathBuf::from(path),
            None => shell.startup_file(home_dir()?),
        };

        let template = match config.template {
            Some(path) => PathBuf::from(path),
            None => default_config_dir()?.join(format!("{shell}rc-template")),
        };

        let sync = config.sync.map(|sync| {
            let repo_dir = PathBuf::from(sync.repo_dir);
            let file = sync.file.unwrap_or_else(|| Self::SYNC_FILE.into());
            SyncSettings {
                sync_file: repo_dir.join(file),
                repo_dir,
                auto_push: sync.auto_push,
            }
        });

        Ok(Self {
            data_file: config
                .data_file
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("aliases.json")),
            script_file: config
                .script_file
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("aliases.sh")),
            shell,
            shell_config,
            template,
            sync,
        })
    }

    /// Settings that keep every file under one directory.
    ///
    /// Mostly useful for scratch setups and tests.
    pub fn rooted_at(root: impl AsRef<Path>, shell: ShellKind) -> Self {
        let root = root.as_ref();
        Self {
            data_file: root.join("aliases.json"),
            script_file: root.join("aliases.sh"),
            shell,
            shell_config: root.join(format!(".{shell}rc")),
            template: root.join(format!("{shell}rc-template")),
            sync: None,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Failed to locate home directory for defaults.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;

    #[sealed_test(env = [("BLAH", "/home/blah")])]
    fn deserialize_config_file() -> anyhow::Result<()> {
        let result: ConfigFile = r#"
            data_file = "$BLAH/.alias-manager/aliases.json"
            script_file = "$BLAH/.alias-manager/aliases.sh"
            shell = "bash"
            shell_config = "$BLAH/.bashrc"

            [sync]
            repo_dir = "$BLAH/dotfiles"
            auto_push = true
        "#
        .parse()?;

        let expect = ConfigFile {
            data_file: Some("/home/blah/.alias-manager/aliases.json".into()),
            script_file: Some("/home/blah/.alias-manager/aliases.sh".into()),
            shell: Some(ShellKind::Bash),
            shell_config: Some("/home/blah/.bashrc".into()),
            template: None,
            sync: Some(SyncConfig {
                repo_dir: "/home/blah/dotfiles".into(),
                file: None,
                auto_push: true,
            }),
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_rejects_unknown_keys() {
        let result = "data_fil = \"typo\"".parse::<ConfigFile>();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn resolve_explicit_settings() -> anyhow::Result<()> {
        let config: ConfigFile = r#"
            data_file = "/tmp/am/aliases.json"
            script_file = "/tmp/am/aliases.sh"
            shell_config = "/tmp/am/.zshrc"
            template = "/tmp/am/template"

            [sync]
            repo_dir = "/tmp/dotfiles"
            file = "am.json"
        "#
        .parse()?;

        let result = Settings::resolve(config, ShellKind::Fish)?;
        let expect = Settings {
            data_file: "/tmp/am/aliases.json".into(),
            script_file: "/tmp/am/aliases.sh".into(),
            shell: ShellKind::Fish,
            shell_config: "/tmp/am/.zshrc".into(),
            template: "/tmp/am/template".into(),
            sync: Some(SyncSettings {
                repo_dir: "/tmp/dotfiles".into(),
                sync_file: "/tmp/dotfiles/am.json".into(),
                auto_push: false,
            }),
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn resolve_default_startup_file() -> anyhow::Result<()> {
        let result = Settings::resolve(ConfigFile::default(), ShellKind::Bash)?;
        assert_eq!(result.shell, ShellKind::Bash);
        assert_eq!(result.shell_config, PathBuf::from("/home/blah/.bashrc"));
        assert_eq!(result.sync, None);

        Ok(())
    }

    #[test]
    fn load_missing_explicit_file() {
        let result = Settings::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test_case("/bin/zsh", Some(ShellKind::Zsh); "zsh")]
    #[test_case("/usr/local/bin/bash", Some(ShellKind::Bash); "bash")]
    #[test_case("/usr/bin/fish", Some(ShellKind::Fish); "fish")]
    #[test_case("/bin/tcsh", None; "unsupported")]
    #[test]
    fn shell_kind_from_path(shell: &str, expect: Option<ShellKind>) {
        pretty_assertions::assert_eq!(ShellKind::from_shell_path(shell), expect);
    }
}

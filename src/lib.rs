// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias-manager keeps shell aliases organized in named groups.
//!
//! Aliases live in a JSON __alias document__ that is the single source of
//! truth. Every change to the alias document regenerates an __alias script__
//! of plain `alias name='command'` lines, which the user's shell sources at
//! startup. Aliases can be disabled without being deleted, imported from an
//! existing shell startup file, and synchronized between machines through a
//! Git work tree.
//!
//! # Modules
//!
//! - [`validate`]: syntax rules for alias names, commands, and group names.
//! - [`document`]: in-memory alias document and its edit operations.
//! - [`store`]: loading, saving, and script generation.
//! - [`import`]: shell startup file parser and merge engine.
//! - [`integrate`]: patching of shell startup files.
//! - [`sync`]: Git synchronization of the alias document.
//! - [`config`]: configuration file and resolved settings.

pub mod atomic;
pub mod config;
pub mod document;
pub mod import;
pub mod integrate;
pub mod path;
pub mod store;
pub mod sync;
pub mod validate;

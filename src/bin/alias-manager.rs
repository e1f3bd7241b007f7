// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use alias_manager::{
    config::Settings,
    document::{AliasDocument, AliasGroup, DEFAULT_GROUP},
    import::imported_count,
    integrate::{self, Patch},
    store::Store,
    sync::{commit_message, Pulled, Syncer},
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use inquire::Confirm;
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "alias-manager [options] <command> [<args>]...",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;
        match self.command {
            Command::Add(opts) => run_add(&settings, opts),
            Command::List(opts) => run_list(&settings, opts),
            Command::Remove(opts) => run_remove(&settings, opts),
            Command::Disable(opts) => run_toggle(&settings, opts, true),
            Command::Enable(opts) => run_toggle(&settings, opts, false),
            Command::DisableGroup(opts) => run_toggle_group(&settings, opts, true),
            Command::EnableGroup(opts) => run_toggle_group(&settings, opts, false),
            Command::Backup(opts) => run_backup(&settings, opts),
            Command::Restore(opts) => run_restore(&settings, opts),
            Command::Install => run_install(&settings),
            Command::Uninstall => run_uninstall(&settings),
            Command::SetupInfo => run_setup_info(&settings),
            Command::Import(opts) => run_import(&settings, opts),
            Command::ImportPreview(opts) => run_import_preview(&settings, opts),
            Command::Sync => run_sync(&settings),
            Command::SetupZshrc(opts) => run_setup_zshrc(&settings, opts),
            Command::Update => run_update(&settings),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Add new alias to a group.
    #[command(override_usage = "alias-manager add [options] <name> <command>")]
    Add(AddOptions),

    /// List aliases, or groups with `list group`.
    #[command(override_usage = "alias-manager list [options] [<group> | group]")]
    List(ListOptions),

    /// Remove alias from a group.
    #[command(override_usage = "alias-manager remove [options] <name>")]
    Remove(AliasOptions),

    /// Disable alias without removing it.
    #[command(override_usage = "alias-manager disable [options] <name>")]
    Disable(AliasOptions),

    /// Enable disabled alias.
    #[command(override_usage = "alias-manager enable [options] <name>")]
    Enable(AliasOptions),

    /// Disable every alias of a group.
    #[command(override_usage = "alias-manager disable-group <group>")]
    DisableGroup(GroupOptions),

    /// Enable every alias of a group.
    #[command(override_usage = "alias-manager enable-group <group>")]
    EnableGroup(GroupOptions),

    /// Write copy of alias document to a file.
    #[command(override_usage = "alias-manager backup <file>")]
    Backup(FileOptions),

    /// Replace alias document with a backup.
    #[command(override_usage = "alias-manager restore <file>")]
    Restore(FileOptions),

    /// Source alias script from shell startup file.
    Install,

    /// Stop sourcing alias script from shell startup file.
    Uninstall,

    /// Show installation instructions.
    SetupInfo,

    /// Import aliases from shell configuration file.
    #[command(override_usage = "alias-manager import [<file>]")]
    Import(ImportOptions),

    /// Show what import would bring in without changing anything.
    #[command(override_usage = "alias-manager import-preview [<file>]")]
    ImportPreview(ImportOptions),

    /// Pull sync file from Git, and apply it.
    Sync,

    /// Replace shell startup file with configured template.
    #[command(override_usage = "alias-manager setup-zshrc [options]")]
    SetupZshrc(SetupZshrcOptions),

    /// Regenerate alias script, and repair `am` shortcut.
    Update,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct AddOptions {
    /// Name of alias.
    #[arg(required = true, value_name = "name")]
    pub name: String,

    /// Command the alias expands to.
    #[arg(required = true, value_name = "command")]
    pub command: String,

    /// Group to add alias to.
    #[arg(short, long, value_name = "group", default_value = DEFAULT_GROUP)]
    pub group: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListOptions {
    /// Only list this group, or list group summaries with "group".
    #[arg(value_name = "group")]
    pub group: Option<String>,

    /// Show disabled aliases too.
    #[arg(long)]
    pub show_disabled: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct AliasOptions {
    /// Name of alias.
    #[arg(required = true, value_name = "name")]
    pub name: String,

    /// Group alias belongs to.
    #[arg(short, long, value_name = "group", default_value = DEFAULT_GROUP)]
    pub group: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GroupOptions {
    /// Name of group.
    #[arg(required = true, value_name = "group")]
    pub group: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct FileOptions {
    /// Path to backup file.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ImportOptions {
    /// Shell configuration file to import from, defaults to the configured
    /// shell startup file.
    #[arg(value_name = "file")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SetupZshrcOptions {
    /// Do not ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_add(settings: &Settings, opts: AddOptions) -> Result<()> {
    let store = Store::new(settings);
    let edit = store.edit(|document| document.add_alias(&opts.name, &opts.command, &opts.group))?;
    info!("added alias {:?} to group {:?}", opts.name, opts.group);

    auto_push(
        settings,
        &edit.document,
        format!("add alias '{}' to group '{}'", opts.name, opts.group),
    );

    Ok(())
}

fn run_list(settings: &Settings, opts: ListOptions) -> Result<()> {
    let document = Store::new(settings).load()?;

    match opts.group.as_deref() {
        Some("group") => {
            for summary in document.group_summaries() {
                println!(
                    "{} ({}/{} active)",
                    summary.name, summary.active, summary.total
                );
            }
        }
        Some(group) => print_group(group, document.group(group)?, opts.show_disabled),
        None => {
            let mut groups = document.groups.iter().peekable();
            while let Some((name, group)) = groups.next() {
                print_group(name, group, opts.show_disabled);
                if groups.peek().is_some() {
                    println!();
                }
            }
        }
    }

    Ok(())
}

fn print_group(name: &str, group: &AliasGroup, show_disabled: bool) {
    println!("{name}:");
    if group.is_empty() {
        println!("  (no aliases)");
        return;
    }

    for (alias, entry) in group.iter().filter(|(_, entry)| !entry.disabled) {
        println!("  {alias} = {}", entry.cmd);
    }

    if show_disabled {
        for (alias, entry) in group.iter().filter(|(_, entry)| entry.disabled) {
            println!("  {alias} = {} (disabled)", entry.cmd);
        }
    }
}

fn run_remove(settings: &Settings, opts: AliasOptions) -> Result<()> {
    let store = Store::new(settings);
    let edit = store.edit(|document| document.remove_alias(&opts.name, &opts.group))?;
    info!("removed alias {:?} from group {:?}", opts.name, opts.group);

    auto_push(
        settings,
        &edit.document,
        format!("remove alias '{}' from group '{}'", opts.name, opts.group),
    );

    Ok(())
}

fn run_toggle(settings: &Settings, opts: AliasOptions, disabled: bool) -> Result<()> {
    let state = if disabled { "disabled" } else { "enabled" };
    let store = Store::new(settings);
    let edit = store.edit(|document| {
        document.set_alias_disabled(&opts.name, &opts.group, disabled)
    })?;

    if !edit.outcome {
        info!("alias {:?} in group {:?} is already {state}", opts.name, opts.group);
        return Ok(());
    }
    info!("{state} alias {:?} in group {:?}", opts.name, opts.group);

    let verb = if disabled { "disable" } else { "enable" };
    auto_push(
        settings,
        &edit.document,
        format!("{verb} alias '{}' in group '{}'", opts.name, opts.group),
    );

    Ok(())
}

fn run_toggle_group(settings: &Settings, opts: GroupOptions, disabled: bool) -> Result<()> {
    let state = if disabled { "disabled" } else { "enabled" };
    let store = Store::new(settings);
    let edit = store.edit(|document| document.set_group_disabled(&opts.group, disabled))?;

    if edit.outcome == 0 {
        info!("every alias in group {:?} is already {state}", opts.group);
        return Ok(());
    }
    info!("{state} {} aliases in group {:?}", edit.outcome, opts.group);

    let verb = if disabled { "disable" } else { "enable" };
    auto_push(
        settings,
        &edit.document,
        format!("{verb} group '{}'", opts.group),
    );

    Ok(())
}

fn run_backup(settings: &Settings, opts: FileOptions) -> Result<()> {
    let document = Store::new(settings).backup(&opts.file)?;
    info!(
        "backed up {} aliases to {:?}",
        document.alias_count(),
        opts.file.display()
    );

    Ok(())
}

fn run_restore(settings: &Settings, opts: FileOptions) -> Result<()> {
    let document = Store::new(settings).restore(&opts.file)?;
    info!(
        "restored {} aliases from {:?}",
        document.alias_count(),
        opts.file.display()
    );

    auto_push(
        settings,
        &document,
        format!("restore aliases from '{}'", opts.file.display()),
    );

    Ok(())
}

fn run_install(settings: &Settings) -> Result<()> {
    let store = Store::new(settings);
    store.generate_alias_file(&store.load()?)?;

    match integrate::install(settings)? {
        Patch::Applied { backup } => {
            info!("installed into {:?}", settings.shell_config.display());
            info!("backup of old file at {:?}", backup.display());
            info!("reload your shell: source {}", settings.shell_config.display());
        }
        Patch::Unchanged => {
            info!("already installed in {:?}", settings.shell_config.display())
        }
    }

    Ok(())
}

fn run_uninstall(settings: &Settings) -> Result<()> {
    match integrate::uninstall(settings)? {
        Patch::Applied { backup } => {
            info!("uninstalled from {:?}", settings.shell_config.display());
            info!("backup of old file at {:?}", backup.display());
        }
        Patch::Unchanged => {
            info!("not installed in {:?}", settings.shell_config.display())
        }
    }

    Ok(())
}

fn run_setup_info(settings: &Settings) -> Result<()> {
    print!("{}", integrate::setup_info(settings));
    Ok(())
}

fn run_import(settings: &Settings, opts: ImportOptions) -> Result<()> {
    let store = Store::new(settings);
    let imported = store.import_from_file(opts.file.as_deref())?;
    if imported.is_empty() {
        info!("no aliases found");
        return Ok(());
    }
    info!(
        "found {} aliases in {} groups",
        imported_count(&imported),
        imported.len()
    );

    let report = store.merge_imported_data(&imported)?;
    for rejection in &report.rejected {
        warn!(
            "rejected alias {:?} in group {:?}: {}",
            rejection.alias.name, rejection.alias.group, rejection.error
        );
    }
    info!(
        "added {}, skipped {} existing, rejected {}",
        report.added.len(),
        report.skipped.len(),
        report.rejected.len()
    );

    if report.changed() {
        let document = store.load()?;
        auto_push(
            settings,
            &document,
            format!("import {} aliases", report.added.len()),
        );
    }

    Ok(())
}

fn run_import_preview(settings: &Settings, opts: ImportOptions) -> Result<()> {
    let imported = Store::new(settings).import_from_file(opts.file.as_deref())?;
    if imported.is_empty() {
        info!("no aliases found");
        return Ok(());
    }

    println!("{} aliases would be imported:", imported_count(&imported));
    for (group, aliases) in &imported {
        println!();
        println!("{group}:");
        for (name, alias) in aliases {
            println!("  {name} = {:?}", alias.cmd);
            if alias.has_custom_description() {
                println!("    {}", alias.description);
            }
        }
    }

    Ok(())
}

fn run_sync(settings: &Settings) -> Result<()> {
    let Some(sync) = settings.sync.as_ref() else {
        bail!("no [sync] table in configuration file");
    };

    match Syncer::new(sync).pull(&Store::new(settings))? {
        Pulled::Created => {
            info!("created sync file at {:?}", sync.sync_file.display());
            info!("commit it to share your aliases");
        }
        Pulled::Applied(document) => {
            info!("applied {} aliases from sync file", document.alias_count());
        }
    }

    Ok(())
}

fn run_setup_zshrc(settings: &Settings, opts: SetupZshrcOptions) -> Result<()> {
    if !opts.yes {
        let message = format!(
            "replace {} with {}?",
            settings.shell_config.display(),
            settings.template.display()
        );
        if !Confirm::new(&message).with_default(false).prompt()? {
            info!("left {:?} alone", settings.shell_config.display());
            return Ok(());
        }
    }

    if let Some(backup) = integrate::setup_from_template(settings)? {
        info!("backup of old file at {:?}", backup.display());
    }
    info!("reload your shell: source {}", settings.shell_config.display());

    Ok(())
}

fn run_update(settings: &Settings) -> Result<()> {
    let store = Store::new(settings);
    store.generate_alias_file(&store.load()?)?;
    info!("regenerated {:?}", store.script_file().display());

    match integrate::repair_shortcut(settings)? {
        Patch::Applied { backup } => {
            info!("repaired am shortcut in {:?}", settings.shell_config.display());
            info!("backup of old file at {:?}", backup.display());
        }
        Patch::Unchanged => info!("am shortcut already in place"),
    }

    Ok(())
}

/// Commit and push sync file if configured to do so.
///
/// The local change already happened at this point, so failure only warns.
fn auto_push(settings: &Settings, document: &AliasDocument, summary: String) {
    let Some(sync) = settings.sync.as_ref().filter(|sync| sync.auto_push) else {
        return;
    };

    if let Err(error) = Syncer::new(sync).publish(document, &commit_message(summary)) {
        warn!("failed to push sync file: {error:?}");
    }
}

//! CLI entry point for Lockbox.
//!
//! This binary provides the `lockbox` command: one-shot subcommands for
//! scripting and an interactive session when run without one.

mod cli;
mod config;
mod dispatch;
mod generator;
mod helpers;
mod repl;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lockbox_store::SqliteCollection;
use lockbox_vault::{DeleteTarget, Selector, VaultStore};
use tracing::info;

use crate::cli::{Cli, Commands, DeleteArgs};
use crate::config::Config;
use crate::dispatch::{Command, dispatch, render};
use crate::generator::RandomPasswordSupplier;
use crate::helpers::{confirm, init_tracing, prompt_secret};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the requested command succeeded.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let mut config = Config::load(&cli.config)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(db) = cli.db {
        config.storage.database_path = db;
    }

    init_tracing(&config.logging.level);

    let db_path = config.storage.database_path.clone();
    info!(db = %db_path.display(), "opening vault");
    let collection = SqliteCollection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    let vault = VaultStore::new(collection);
    let supplier = RandomPasswordSupplier::new(config.generator.length);

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();

    let succeeded = match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            repl::run_repl(&vault, &supplier, &mut input, &mut out)?;
            true
        }
        Commands::Status => {
            writeln!(out, "Database: {}", db_path.display())?;
            writeln!(out, "Schema version: {}", vault.collection().schema_version()?)?;
            render(&mut out, dispatch(&vault, &supplier, Command::Status), false)?
        }
        other => {
            let json = matches!(
                other,
                Commands::List { json: true } | Commands::Search { json: true, .. }
            );
            let command = build_command(other, &mut input, &mut out)?;
            render(&mut out, dispatch(&vault, &supplier, command), json)?
        }
    };

    out.flush()?;
    vault
        .into_inner()
        .close()
        .context("failed to close database")?;
    info!("vault closed");
    Ok(succeeded)
}

/// Turn a one-shot subcommand into a [`Command`], prompting where the
/// arguments leave something open.
fn build_command(
    command: Commands,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<Command> {
    Ok(match command {
        Commands::Add {
            domain,
            identity,
            password,
            generate,
        } => {
            let password = match (password, generate) {
                (Some(password), _) => Some(password),
                (None, true) => None,
                (None, false) => {
                    let Some(answer) =
                        prompt_secret("Password (leave empty to generate one): ", input, out)?
                    else {
                        bail!("no password given");
                    };
                    Some(answer).filter(|a| !a.is_empty())
                }
            };
            Command::Add {
                domain,
                identity,
                password,
            }
        }
        Commands::List { .. } => Command::List,
        Commands::Search { field, text, .. } => Command::Search(field.criterion(text)),
        Commands::Update { field, old, new } => Command::Update {
            selector: field.selector(old),
            new_value: new,
        },
        Commands::SetPassword {
            field,
            value,
            new_password,
        } => Command::SetPassword {
            selector: field.selector(value),
            new_password,
        },
        Commands::Delete { target, yes } => delete_command(target, yes, input, out)?,
        Commands::Status | Commands::Repl => bail!("not a one-shot command"),
    })
}

fn delete_command(
    args: DeleteArgs,
    yes: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<Command> {
    let target = match args {
        DeleteArgs { all: true, .. } => DeleteTarget::All,
        DeleteArgs {
            domain: Some(domain),
            ..
        } => DeleteTarget::One(Selector::ByDomain(domain)),
        DeleteArgs {
            identity: Some(identity),
            ..
        } => DeleteTarget::One(Selector::ByIdentity(identity)),
        DeleteArgs {
            password: Some(password),
            ..
        } => DeleteTarget::One(Selector::ByPlaintextSecret(password)),
        DeleteArgs { .. } => bail!("nothing selected for deletion"),
    };

    let confirmed = match target {
        DeleteTarget::All if !yes => confirm("Delete ALL records?", input, out)?,
        _ => true,
    };
    Ok(Command::Delete { target, confirmed })
}

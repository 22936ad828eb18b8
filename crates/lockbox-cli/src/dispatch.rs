//! Command dispatch.
//!
//! Both the one-shot subcommands and the REPL build a [`Command`], hand it
//! to [`dispatch`] and print the result with [`render`]. Dispatch never
//! prints; rendering never touches the vault.

use std::io::Write;

use lockbox_vault::{
    Collection, Criterion, DeleteOutcome, DeleteTarget, Entries, PasswordSupplier, RecordId,
    Result, Selector, VaultError, VaultStore,
};
use serde_json::json;
use tracing::{debug, warn};

/// One operator request against the vault.
#[derive(Debug)]
pub enum Command {
    /// Store a credential. Without a password the supplier suggests one.
    Add {
        domain: String,
        identity: String,
        password: Option<String>,
    },
    List,
    Search(Criterion),
    /// Overwrite the field named by the selector.
    Update { selector: Selector, new_value: String },
    /// Replace the password of the selected record.
    SetPassword {
        selector: Selector,
        new_password: String,
    },
    Delete {
        target: DeleteTarget,
        confirmed: bool,
    },
    Status,
}

/// What a successful command produced.
#[derive(Debug)]
pub enum Outcome {
    Added {
        id: RecordId,
        /// The suggested password, when one was generated.
        generated: Option<String>,
    },
    Entries(Entries),
    Updated(RecordId),
    Deleted(u64),
    Cancelled,
    Status { records: u64 },
}

/// Run `command` against `vault`.
pub fn dispatch<C: Collection>(
    vault: &VaultStore<C>,
    supplier: &dyn PasswordSupplier,
    command: Command,
) -> Result<Outcome> {
    debug!(command = command_name(&command), "dispatching");

    match command {
        Command::Add {
            domain,
            identity,
            password,
        } => {
            let (password, generated) = match password {
                Some(password) => (password, false),
                None => (supplier.suggest()?, true),
            };
            let id = vault.add(&domain, &identity, &password)?;
            Ok(Outcome::Added {
                id,
                generated: generated.then_some(password),
            })
        }
        Command::List => Ok(Outcome::Entries(vault.list_all()?)),
        Command::Search(criterion) => Ok(Outcome::Entries(vault.search(&criterion)?)),
        Command::Update {
            selector,
            new_value,
        } => Ok(Outcome::Updated(vault.update(&selector, &new_value)?)),
        Command::SetPassword {
            selector,
            new_password,
        } => Ok(Outcome::Updated(
            vault.replace_secret(&selector, &new_password)?,
        )),
        Command::Delete { target, confirmed } => match vault.delete(&target, confirmed)? {
            DeleteOutcome::Deleted(n) => Ok(Outcome::Deleted(n)),
            DeleteOutcome::Cancelled => Ok(Outcome::Cancelled),
        },
        Command::Status => Ok(Outcome::Status {
            records: vault.count()?,
        }),
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Add { .. } => "add",
        Command::List => "list",
        Command::Search(_) => "search",
        Command::Update { .. } => "update",
        Command::SetPassword { .. } => "set-password",
        Command::Delete { .. } => "delete",
        Command::Status => "status",
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Print the result of a command. Returns `false` when it was an error.
///
/// Every [`VaultError`] kind gets its own message so the operator can tell
/// a weak password from a missing record from a broken database.
pub fn render(out: &mut dyn Write, result: Result<Outcome>, json: bool) -> std::io::Result<bool> {
    match result {
        Ok(outcome) if json => render_json(out, outcome).map(|()| true),
        Ok(outcome) => render_text(out, outcome).map(|()| true),
        Err(err) => {
            warn!(error = %err, "command failed");
            writeln!(out, "{}", describe_error(&err))?;
            Ok(false)
        }
    }
}

/// Operator-facing message for a vault error.
pub fn describe_error(err: &VaultError) -> String {
    match err {
        VaultError::PolicyViolation(v) => format!("Password validation error: {v}"),
        VaultError::EmptyField { field } => format!("Invalid input: {field} must not be empty"),
        VaultError::EncryptionFailed { reason } => format!("Encryption error: {reason}"),
        VaultError::DecryptionFailed { reason } => format!("Decryption error: {reason}"),
        VaultError::NotFound { selector } => format!("Not found: no record matches {selector}"),
        VaultError::SupplierFailed { reason } => format!("Password generation failed: {reason}"),
        VaultError::Store(e) => format!("Storage error: {e}"),
    }
}

fn render_text(out: &mut dyn Write, outcome: Outcome) -> std::io::Result<()> {
    match outcome {
        Outcome::Added { id, generated } => {
            if let Some(password) = generated {
                writeln!(out, "Your password is {password}")?;
            }
            writeln!(out, "Password added successfully ({id}).")?;
        }
        Outcome::Entries(entries) => {
            if entries.len() == 0 {
                writeln!(out, "No matches.")?;
                return Ok(());
            }
            for item in entries {
                match item {
                    Ok(entry) => {
                        writeln!(out, "Domain: {}, Identity: {}", entry.domain, entry.identity)?;
                        writeln!(out, "Password: {}", entry.secret)?;
                    }
                    Err(unreadable) => {
                        warn!(id = %unreadable.id, error = %unreadable.source, "unreadable record");
                        writeln!(
                            out,
                            "Domain: {}, Identity: {}",
                            unreadable.domain, unreadable.identity
                        )?;
                        writeln!(out, "Password: <unreadable: {}>", unreadable.source)?;
                    }
                }
            }
        }
        Outcome::Updated(id) => writeln!(out, "Record updated ({id}).")?,
        Outcome::Deleted(1) => writeln!(out, "Deleted 1 record.")?,
        Outcome::Deleted(n) => writeln!(out, "Deleted {n} records.")?,
        Outcome::Cancelled => writeln!(out, "Cancelled; nothing deleted.")?,
        Outcome::Status { records } => writeln!(out, "Records stored: {records}")?,
    }
    Ok(())
}

fn render_json(out: &mut dyn Write, outcome: Outcome) -> std::io::Result<()> {
    let value = match outcome {
        Outcome::Added { id, generated } => json!({ "added": id, "generated": generated }),
        Outcome::Entries(entries) => {
            let items: Vec<serde_json::Value> = entries
                .map(|item| match item {
                    Ok(entry) => json!(entry),
                    Err(unreadable) => json!({
                        "id": unreadable.id,
                        "domain": unreadable.domain,
                        "identity": unreadable.identity,
                        "error": unreadable.source.to_string(),
                    }),
                })
                .collect();
            serde_json::Value::Array(items)
        }
        Outcome::Updated(id) => json!({ "updated": id }),
        Outcome::Deleted(n) => json!({ "deleted": n }),
        Outcome::Cancelled => json!({ "deleted": 0, "cancelled": true }),
        Outcome::Status { records } => json!({ "records": records }),
    };
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)
}

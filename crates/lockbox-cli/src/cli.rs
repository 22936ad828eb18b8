//! CLI argument definitions for Lockbox.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! wiring and dispatching subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lockbox_vault::{Criterion, Selector};

use crate::config::DEFAULT_CONFIG_PATH;

/// Lockbox -- a personal credential vault.
#[derive(Parser)]
#[command(
    name = "lockbox",
    version,
    about = "Lockbox -- personal credential vault",
    long_about = "Stores domain, identity and password triples. Every password is \
                  encrypted with its own key. Run without a subcommand for an \
                  interactive session."
)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Database file; overrides the config file and `LOCKBOX_DB_PATH`.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a new credential.
    Add {
        /// Domain the credential belongs to (stored title-cased).
        domain: String,

        /// Account identity, e.g. user name or email.
        identity: String,

        /// Password to store. Prompted for when neither this nor
        /// `--generate` is given.
        #[arg(long, short, conflicts_with = "generate")]
        password: Option<String>,

        /// Generate a strong random password.
        #[arg(long, short)]
        generate: bool,
    },

    /// Show every stored credential, decrypted.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Case-insensitive substring search.
    Search {
        #[arg(value_enum)]
        field: SearchField,

        text: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Overwrite the selected field of the first matching record.
    Update {
        #[arg(value_enum)]
        field: SelectorField,

        /// Current value used to find the record.
        old: String,

        /// Replacement value.
        new: String,
    },

    /// Replace the password of the record found by domain or identity.
    SetPassword {
        #[arg(value_enum)]
        field: SearchField,

        /// Domain or identity of the record.
        value: String,

        new_password: String,
    },

    /// Delete one record, or all of them.
    Delete {
        #[command(flatten)]
        target: DeleteArgs,

        /// Do not ask before deleting everything.
        #[arg(long, short)]
        yes: bool,
    },

    /// Show database location, schema version and record count.
    Status,

    /// Start an interactive session (the default).
    Repl,
}

/// Exactly one way of choosing what to delete.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct DeleteArgs {
    /// Delete the first record with this domain.
    #[arg(long)]
    pub domain: Option<String>,

    /// Delete the first record with this identity.
    #[arg(long)]
    pub identity: Option<String>,

    /// Delete the first record whose password equals this value.
    #[arg(long)]
    pub password: Option<String>,

    /// Delete every record.
    #[arg(long)]
    pub all: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SearchField {
    Domain,
    Identity,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SelectorField {
    Domain,
    Identity,
    Password,
}

impl SearchField {
    pub fn criterion(self, text: String) -> Criterion {
        match self {
            Self::Domain => Criterion::ByDomainSubstring(text),
            Self::Identity => Criterion::ByIdentitySubstring(text),
        }
    }

    pub fn selector(self, value: String) -> Selector {
        match self {
            Self::Domain => Selector::ByDomain(value),
            Self::Identity => Selector::ByIdentity(value),
        }
    }
}

impl SelectorField {
    pub fn selector(self, value: String) -> Selector {
        match self {
            Self::Domain => Selector::ByDomain(value),
            Self::Identity => Selector::ByIdentity(value),
            Self::Password => Selector::ByPlaintextSecret(value),
        }
    }
}

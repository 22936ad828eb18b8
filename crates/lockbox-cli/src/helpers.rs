//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization and the small line-based prompts used by
//! both one-shot subcommands and the REPL.

use std::io::{BufRead, Write};

use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
///
/// `RUST_LOG` wins over `default_level`. Events go to stderr so they never
/// mix with command output on stdout.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Print `question` and read one trimmed line. `None` on end of input.
pub fn prompt_line(
    question: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> anyhow::Result<Option<String>> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Print `question` and read one line verbatim, minus its line terminator.
/// Used for secrets, where surrounding spaces are part of the value.
/// `None` on end of input.
pub fn prompt_secret(
    question: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> anyhow::Result<Option<String>> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

/// Ask a yes/no question. Anything but `y`/`yes` (including end of input)
/// counts as no.
pub fn confirm(
    question: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let answer = prompt_line(&format!("{question} [y/N]: "), input, out)?;
    Ok(matches!(
        answer.map(|a| a.to_lowercase()).as_deref(),
        Some("y" | "yes")
    ))
}

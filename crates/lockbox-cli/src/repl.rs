//! Interactive session.
//!
//! Reads one command per line, dispatches it and prints the result. A failed
//! command (bad syntax, weak password, missing record, storage error) is
//! reported and the session carries on; only `quit`, `exit` or end of input
//! end it.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use lockbox_vault::{Collection, Criterion, DeleteTarget, PasswordSupplier, Selector, VaultStore};
use tracing::{debug, info};

use crate::dispatch::{Command, dispatch, render};
use crate::helpers::{confirm, prompt_line};

const PROMPT: &str = "lockbox> ";

const HELP: &str = "\
Commands:
  add <domain> <identity> [<password>]          store a credential (no password: generate one)
  list                                           show every credential
  search domain|identity <text>                  case-insensitive substring search
  update domain|identity|password <old> <new>    overwrite the selected field
  set-password domain|identity <value> <new>     replace the password of a record
  delete domain|identity|password <value>        delete one record
  delete all [--yes]                             delete every record
  help                                           show this text
  quit | exit                                    leave

Quote arguments containing spaces: add \"my site\" alice 'Pa55 word!'";

/// A parsed input line.
#[derive(Debug)]
pub enum ReplInput {
    Command(Command),
    Help,
    Quit,
    Empty,
}

/// Run the interactive loop until `quit`, `exit` or end of input.
pub fn run_repl<C: Collection>(
    vault: &VaultStore<C>,
    supplier: &dyn PasswordSupplier,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "Lockbox credential vault. Type `help` for commands.")?;

    loop {
        let Some(line) = prompt_line(PROMPT, input, out)? else {
            writeln!(out)?;
            info!("end of input, leaving session");
            break;
        };

        let command = match parse_command(&line) {
            Ok(ReplInput::Empty) => continue,
            Ok(ReplInput::Help) => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Ok(ReplInput::Quit) => {
                info!("user requested exit");
                break;
            }
            Ok(ReplInput::Command(command)) => command,
            Err(e) => {
                debug!(error = %e, "unparseable input");
                writeln!(out, "Error: {e}. Type `help` for usage.")?;
                continue;
            }
        };

        let command = match command {
            Command::Delete {
                target: DeleteTarget::All,
                confirmed: false,
            } => Command::Delete {
                target: DeleteTarget::All,
                confirmed: confirm("Delete ALL records?", input, out)?,
            },
            other => other,
        };

        render(out, dispatch(vault, supplier, command), false)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse one line of REPL input.
pub fn parse_command(line: &str) -> Result<ReplInput> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(ReplInput::Empty);
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match (head.to_lowercase().as_str(), args.as_slice()) {
        ("help" | "?", _) => return Ok(ReplInput::Help),
        ("quit" | "exit", _) => return Ok(ReplInput::Quit),

        ("add", [domain, identity]) => Command::Add {
            domain: domain.to_string(),
            identity: identity.to_string(),
            password: None,
        },
        ("add", [domain, identity, password]) => Command::Add {
            domain: domain.to_string(),
            identity: identity.to_string(),
            password: Some(password.to_string()),
        },
        ("add", _) => bail!("usage: add <domain> <identity> [<password>]"),

        ("list", []) => Command::List,
        ("list", _) => bail!("usage: list"),

        ("search", [field, text]) => Command::Search(match field.to_lowercase().as_str() {
            "domain" => Criterion::ByDomainSubstring(text.to_string()),
            "identity" => Criterion::ByIdentitySubstring(text.to_string()),
            other => bail!("cannot search by '{other}'"),
        }),
        ("search", _) => bail!("usage: search domain|identity <text>"),

        ("update", [field, old, new]) => Command::Update {
            selector: selector(field, old)?,
            new_value: new.to_string(),
        },
        ("update", _) => bail!("usage: update domain|identity|password <old> <new>"),

        ("set-password", [field, value, new]) => {
            if field.eq_ignore_ascii_case("password") {
                bail!("use `update password <old> <new>` to change a password by its value");
            }
            Command::SetPassword {
                selector: selector(field, value)?,
                new_password: new.to_string(),
            }
        }
        ("set-password", _) => bail!("usage: set-password domain|identity <value> <new-password>"),

        ("delete", ["all"]) => Command::Delete {
            target: DeleteTarget::All,
            confirmed: false,
        },
        ("delete", ["all", "--yes" | "-y"]) => Command::Delete {
            target: DeleteTarget::All,
            confirmed: true,
        },
        ("delete", [field, value]) => Command::Delete {
            target: DeleteTarget::One(selector(field, value)?),
            confirmed: true,
        },
        ("delete", _) => {
            bail!("usage: delete domain|identity|password <value> | delete all [--yes]")
        }

        ("status", []) => Command::Status,

        (other, _) => bail!("unknown command '{other}'"),
    };
    Ok(ReplInput::Command(command))
}

fn selector(field: &str, value: &str) -> Result<Selector> {
    Ok(match field.to_lowercase().as_str() {
        "domain" => Selector::ByDomain(value.to_string()),
        "identity" => Selector::ByIdentity(value.to_string()),
        "password" => Selector::ByPlaintextSecret(value.to_string()),
        other => bail!("cannot select a record by '{other}'"),
    })
}

/// Split a line into whitespace-separated tokens.
///
/// A token that starts with `"` or `'` runs to the matching quote. A quote
/// inside a token is literal, so passwords such as `Pa"55word!` need no
/// escaping. Outside single quotes `\` escapes the next character.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut token = String::new();
        if first == '"' || first == '\'' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    c if c == first => {
                        closed = true;
                        break;
                    }
                    '\\' if first == '"' => {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    c => token.push(c),
                }
            }
            if !closed {
                bail!("unterminated quote");
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        token.push(escaped);
                    }
                } else {
                    token.push(c);
                }
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_vault::{MemoryCollection, Result as VaultResult};
    use std::io::Cursor;

    fn session(vault: &VaultStore<MemoryCollection>, script: &str) -> String {
        let supplier = || -> VaultResult<String> { Ok("Gener4ted!Pw".to_string()) };
        let mut input = Cursor::new(script.as_bytes());
        let mut out = Vec::new();
        run_repl(vault, &supplier, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    // ── tokenizer ──

    #[test]
    fn tokenize_plain_and_quoted() {
        assert_eq!(
            tokenize(r#"add "my site" alice 'Pa55 word!'"#).unwrap(),
            vec!["add", "my site", "alice", "Pa55 word!"]
        );
    }

    #[test]
    fn tokenize_keeps_inner_quotes_literal() {
        assert_eq!(
            tokenize(r#"add a.com bob Pa"55word!"#).unwrap(),
            vec!["add", "a.com", "bob", "Pa\"55word!"]
        );
    }

    #[test]
    fn tokenize_escapes_and_empty_quotes() {
        assert_eq!(tokenize(r"a\ b ''").unwrap(), vec!["a b", ""]);
        assert_eq!(tokenize(r#""say \"hi\"""#).unwrap(), vec![r#"say "hi""#]);
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        assert!(tokenize("add 'oops").is_err());
    }

    // ── parser ──

    #[test]
    fn parse_covers_grammar() {
        assert!(matches!(parse_command("   ").unwrap(), ReplInput::Empty));
        assert!(matches!(parse_command("HELP").unwrap(), ReplInput::Help));
        assert!(matches!(parse_command("exit").unwrap(), ReplInput::Quit));
        assert!(matches!(
            parse_command("add a.com alice").unwrap(),
            ReplInput::Command(Command::Add { password: None, .. })
        ));
        assert!(matches!(
            parse_command("search identity ali").unwrap(),
            ReplInput::Command(Command::Search(Criterion::ByIdentitySubstring(_)))
        ));
        assert!(matches!(
            parse_command("update password Old!Pass1 New!Pass1").unwrap(),
            ReplInput::Command(Command::Update {
                selector: Selector::ByPlaintextSecret(_),
                ..
            })
        ));
        assert!(matches!(
            parse_command("delete all --yes").unwrap(),
            ReplInput::Command(Command::Delete {
                target: DeleteTarget::All,
                confirmed: true
            })
        ));
        assert!(matches!(
            parse_command("delete domain a.com").unwrap(),
            ReplInput::Command(Command::Delete {
                target: DeleteTarget::One(Selector::ByDomain(_)),
                ..
            })
        ));
    }

    #[test]
    fn parse_rejects_bad_input() {
        for line in [
            "frobnicate",
            "add onlydomain",
            "search email x",
            "update colour a b",
            "set-password password a b",
            "delete",
            "list extra",
        ] {
            assert!(parse_command(line).is_err(), "{line}");
        }
    }

    // ── sessions ──

    #[test]
    fn session_add_list_quit() {
        let vault = VaultStore::new(MemoryCollection::new());
        let out = session(&vault, "add example.com alice Str0ng!Pass\nlist\nquit\nlist\n");

        assert!(out.contains("Password added successfully"));
        assert!(out.contains("Domain: Example.Com, Identity: alice\nPassword: Str0ng!Pass\n"));
        assert_eq!(out.matches("Password: Str0ng!Pass").count(), 1);
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let vault = VaultStore::new(MemoryCollection::new());
        let out = session(
            &vault,
            "add a.com alice weak\nbogus\ndelete domain nosuch.com\nadd a.com alice Str0ng!Pass\n",
        );

        assert!(out.contains("Password validation error:"));
        assert!(out.contains("Error: unknown command 'bogus'"));
        assert!(out.contains("Not found:"));
        assert_eq!(vault.count().unwrap(), 1);
    }

    #[test]
    fn delete_all_asks_for_confirmation() {
        let vault = VaultStore::new(MemoryCollection::new());
        vault.add("a.com", "alice", "Str0ng!Pass").unwrap();
        vault.add("b.com", "bob", "Str0ng!Pass").unwrap();

        let out = session(&vault, "delete all\nn\n");
        assert!(out.contains("Delete ALL records? [y/N]: "));
        assert!(out.contains("Cancelled; nothing deleted."));
        assert_eq!(vault.count().unwrap(), 2);

        let out = session(&vault, "delete all\nyes\n");
        assert!(out.contains("Deleted 2 records."));
        assert_eq!(vault.count().unwrap(), 0);
    }

    #[test]
    fn add_without_password_generates_one() {
        let vault = VaultStore::new(MemoryCollection::new());
        let out = session(&vault, "add example.com alice\n");
        assert!(out.contains("Your password is Gener4ted!Pw"));
        assert_eq!(vault.count().unwrap(), 1);
    }
}

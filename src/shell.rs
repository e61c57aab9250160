//! Interactive shell command grammar.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::path::PathBuf;

use wire::{Operation, PasswordPolicy};

pub const HELP: &str = "\
commands:
  select <path>        choose the input file
  encrypt | decrypt    process the selected file and save the result
  hash | verify        compute or verify the selected file's SHA-256
  backup               back up the selected file on the service
  hashes | info        list stored hashes, show service information
  password [len] [no-upper|no-lower|no-digits|no-symbols]...
                       generate a password (12-32, default 16)
  copy-password        copy the last generated password
  log save|copy|clear  export, copy or clear the operation log
  status               telemetry counters, selection and clock
  help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogAction {
    Save,
    Copy,
    Clear,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Select(PathBuf),
    Run(Operation),
    Password(PasswordPolicy),
    CopyPassword,
    Log(LogAction),
    Status,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one line of shell input.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown commands or malformed arguments.
pub fn parse(line: &str) -> Result<ShellCommand, ParseError> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match head {
        "" => ShellCommand::Empty,
        "select" if rest.is_empty() => return Err(ParseError::Usage("select <path>")),
        "select" => ShellCommand::Select(PathBuf::from(rest)),
        "encrypt" => ShellCommand::Run(Operation::Encrypt),
        "decrypt" => ShellCommand::Run(Operation::Decrypt),
        "hash" => ShellCommand::Run(Operation::ComputeHash),
        "verify" => ShellCommand::Run(Operation::VerifyIntegrity),
        "backup" => ShellCommand::Run(Operation::Backup),
        "hashes" => ShellCommand::Run(Operation::ViewHashes),
        "info" => ShellCommand::Run(Operation::SystemInfo),
        "password" => ShellCommand::Password(parse_policy(rest)?),
        "copy-password" => ShellCommand::CopyPassword,
        "log" => match rest {
            "save" => ShellCommand::Log(LogAction::Save),
            "copy" => ShellCommand::Log(LogAction::Copy),
            "clear" => ShellCommand::Log(LogAction::Clear),
            _ => return Err(ParseError::Usage("log save|copy|clear")),
        },
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ParseError::Unknown(other.to_owned())),
    };
    Ok(command)
}

const PASSWORD_USAGE: &str = "password [length] [no-upper|no-lower|no-digits|no-symbols]...";

/// At most one length plus any number of `no-<class>` switches, in any order.
fn parse_policy(args: &str) -> Result<PasswordPolicy, ParseError> {
    let mut policy = PasswordPolicy::default();
    let mut length = None;
    for word in args.split_whitespace() {
        match word {
            "no-upper" => policy.include_upper = false,
            "no-lower" => policy.include_lower = false,
            "no-digits" => policy.include_digits = false,
            "no-symbols" => policy.include_symbols = false,
            _ if length.is_none() => {
                length = Some(word.parse::<u8>().map_err(|_| ParseError::Usage(PASSWORD_USAGE))?);
            }
            _ => return Err(ParseError::Usage(PASSWORD_USAGE)),
        }
    }
    Ok(length.map_or(policy, |length| policy.with_length(length)))
}

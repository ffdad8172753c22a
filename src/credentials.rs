//! Work out which access token to use.
//!
//! The first non-empty source wins:
//!
//! 1. `--token`
//! 2. the output of the instance's `tokencmd`
//! 3. the instance's `token`
//! 4. `$MM_TOKEN`
//!
//! `tokencmd` is run through the shell with the invoking user's privileges.
//! Whoever can edit the config file can run commands as that user, so the
//! file deserves the same care as a shell profile.

use std::{
    io,
    process::{Command, ExitStatus, Stdio},
};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(not(windows))]
const SHELL: (&str, &str) = ("sh", "-c");
#[cfg(windows)]
const SHELL: (&str, &str) = ("cmd", "/C");

/// Ways a token command can fail. None of them are fatal.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("could not be run: {0}")]
    Spawn(#[from] io::Error),
    #[error("exited with {0}")]
    Status(ExitStatus),
    #[error("printed something other than UTF-8")]
    NotUtf8,
}

/// Run `command` through the shell and capture its standard output, minus
/// trailing whitespace.
pub fn run_token_command(command: &str) -> Result<String, CommandError> {
    let output = Command::new(SHELL.0)
        .arg(SHELL.1)
        .arg(command)
        // Piped content is meant for the post, not for the command.
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()?;

    if !output.status.success() {
        return Err(CommandError::Status(output.status));
    }

    let stdout = String::from_utf8(output.stdout).map_err(|_| CommandError::NotUtf8)?;
    Ok(stdout.trim_end().to_owned())
}

fn non_empty(x: Option<&str>) -> Option<&str> {
    x.filter(|s| !s.trim().is_empty())
}

/// Resolve the token from every source in priority order. The command is only
/// run if there's no token on the command line, and its failure just moves
/// things on to the next source. Returns an empty string if nothing turns up;
/// the client refuses to be built with one.
pub fn resolve_token(
    cli_token: Option<&str>,
    command: Option<&str>,
    config_token: Option<&str>,
    env_token: Option<&str>,
) -> String {
    if let Some(token) = non_empty(cli_token) {
        debug!("Using token from the command line");
        return token.to_owned();
    }

    if let Some(command) = non_empty(command) {
        match run_token_command(command) {
            Ok(token) if !token.is_empty() => {
                debug!("Using token from tokencmd");
                return token;
            }
            Ok(_) => warn!("Token command `{}` printed nothing", command),
            Err(e) => warn!("Token command `{}` {}", command, e),
        }
    }

    if let Some(token) = non_empty(config_token) {
        debug!("Using token from the config file");
        return token.to_owned();
    }

    if let Some(token) = non_empty(env_token) {
        debug!("Using token from $MM_TOKEN");
        return token.to_owned();
    }

    String::new()
}

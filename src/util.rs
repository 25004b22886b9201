//! Utility functions for use in the window manager and binding tables.
use crate::{Error, Result};
use std::{
    io::Write,
    process::{exit, Command, Stdio},
};

/// Run an external command with any arguments given as part of the string.
///
/// This redirects the process stdout and stderr to /dev/null.
pub fn spawn<S: Into<String>>(cmd: S) -> Result<()> {
    let s = cmd.into();
    let parts: Vec<&str> = s.split_whitespace().collect();
    let (prog, args) = match parts.split_first() {
        Some(split) => split,
        None => {
            return Err(Error::Spawn {
                cmd: s,
                err: "empty command".to_string(),
            })
        }
    };
    let result = Command::new(prog)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match result {
        Ok(_) => Ok(()),
        Err(e) => Err(Error::Spawn {
            cmd: s,
            err: e.to_string(),
        }),
    }
}

/// Run an external command with the provided arguments.
///
/// This redirects the process stdout and stderr to /dev/null.
pub fn spawn_with_args<S: Into<String>>(cmd: S, args: &[&str]) -> Result<()> {
    let s = cmd.into();
    let result = Command::new(&s)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match result {
        Ok(_) => Ok(()),
        Err(e) => Err(Error::Spawn {
            cmd: s,
            err: e.to_string(),
        }),
    }
}

/// Print a message to stderr and exit non-zero.
///
/// Used for the CLI contract (version / usage) and fatal startup conditions.
pub fn die(msg: &str) -> ! {
    let mut stderr = std::io::stderr();
    _ = writeln!(stderr, "{msg}");
    exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_rejects_empty_command() {
        assert!(matches!(spawn(""), Err(Error::Spawn { .. })));
        assert!(matches!(spawn("   "), Err(Error::Spawn { .. })));
    }
}

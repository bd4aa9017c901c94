use crate::env::Environment;
use anyhow::Result;
use std::ffi::OsStr;
use std::io::{self, Write};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// Diagnostics meant for the user go to `stderr`; an `Err` is reserved for
    /// failures to write those diagnostics.
    fn execute(self: Box<Self>, stderr: &mut dyn Write, env: &mut Environment)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &OsStr,
        args: &[&OsStr],
    ) -> Option<Box<dyn ExecutableCommand>>;
}

/// Render an I/O error the way `strerror(3)` would.
///
/// Errors carrying an OS error number lose the `(os error N)` suffix Rust adds;
/// anything else falls back to its `Display` text.
pub fn describe_io_error(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => nix::errno::Errno::from_raw(code).desc().to_string(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_errors_are_described_without_code_suffix() {
        let err = io::Error::from_raw_os_error(nix::libc::ENOENT);
        assert_eq!(describe_io_error(&err), "No such file or directory");
    }

    #[test]
    fn test_custom_errors_keep_their_message() {
        let err = io::Error::other("broken pipe dream");
        assert_eq!(describe_io_error(&err), "broken pipe dream");
    }
}

use crate::command::{CommandFactory, ExecutableCommand, ExitCode, describe_io_error};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Result, anyhow};
use log::debug;
use std::env;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are executed directly in-process without spawning a child process.
/// Arguments are taken as-is; a builtin ignores the ones it has no use for.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Build the command from the words following its name.
    fn from_args(args: &[&OsStr]) -> Self;

    /// Executes the command against the interpreter environment.
    ///
    /// An `Err` is reported to the user by the caller and turns into exit code 1.
    fn execute(self, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stderr: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stderr, "{}", e)?;
                Ok(1)
            }
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &OsStr,
        args: &[&OsStr],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(Box::new(T::from_args(args)))
        } else {
            None
        }
    }
}

/// Change the working directory of the shell process.
///
/// Without a target, changes to the home directory of the invoking user.
pub struct Cd {
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<OsString>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[&OsStr]) -> Self {
        Self {
            target: args.first().map(|t| t.to_os_string()),
        }
    }

    fn execute(self, env: &mut Environment) -> Result<ExitCode> {
        let target = match self.target {
            Some(t) => PathBuf::from(t),
            None => env
                .home_dir()
                .ok_or_else(|| anyhow!("cd: cannot determine home directory"))?,
        };

        env::set_current_dir(&target).map_err(|e| anyhow!("cd: {}", describe_io_error(&e)))?;
        debug!("working directory is now {}", target.display());
        Ok(0)
    }
}

/// Exit the shell with status 0. Arguments are ignored.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[&OsStr]) -> Self {
        Exit
    }

    fn execute(self, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

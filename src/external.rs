use crate::command::{CommandFactory, ExecutableCommand, ExitCode, describe_io_error};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::Result;
use log::debug;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::process::{Command, ExitStatus};

/// Prefix of diagnostics about commands that could not be run.
const DIAGNOSTIC_PREFIX: &str = "Tshell";

/// Command that is not a builtin.
///
/// The program is looked up through `PATH` by the host, the same way `execvp`
/// does, and receives its name exactly as typed as `argv[0]`. It inherits the
/// environment and working directory of the shell.
pub struct ExternalCommand {
    name: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: OsString, args: Vec<OsString>) -> Self {
        Self { name, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &OsStr,
        args: &[&OsStr],
    ) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(
            name.to_os_string(),
            args.iter().map(|x| x.to_os_string()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, stderr: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let spawned = Command::new(&self.name).args(&self.args).spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                report(stderr, &self.name, &e)?;
                return Ok(1);
            }
        };

        debug!("started {:?} as pid {}", self.name, child.id());
        let exit_status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                report(stderr, &self.name, &e)?;
                return Ok(1);
            }
        };
        debug!("pid {} finished: {}", child.id(), exit_status);

        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

/// The name is written back byte for byte.
fn report(stderr: &mut dyn Write, name: &OsStr, err: &io::Error) -> io::Result<()> {
    write!(stderr, "{}: ", DIAGNOSTIC_PREFIX)?;
    stderr.write_all(name.as_bytes())?;
    writeln!(stderr, ": {}", describe_io_error(err))
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

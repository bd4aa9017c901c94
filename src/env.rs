use log::warn;
use nix::unistd::{Uid, User};
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, user-level view of the process state used by the interpreter.
///
/// Only the exit request lives here. Environment variables are not copied:
/// nothing on the command line can change them, so children inherit the
/// process environment as it is, bytes and all. The working directory is not
/// mirrored either: `cd` changes the directory of the whole process.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    pub fn new() -> Self {
        Self { should_exit: false }
    }

    /// Home directory of the user running the shell.
    ///
    /// Resolved from the user database entry of the real uid. `HOME` is only
    /// consulted when the user database has no entry for us.
    pub fn home_dir(&self) -> Option<PathBuf> {
        match User::from_uid(Uid::current()) {
            Ok(Some(user)) => return Some(user.dir),
            Ok(None) => warn!("no user database entry for uid {}", Uid::current()),
            Err(e) => warn!("user database lookup failed: {}", e.desc()),
        }
        stdenv::var_os("HOME").map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;

    #[test]
    fn test_new_environment_does_not_exit() {
        assert!(!Environment::new().should_exit);
        assert!(!Environment::default().should_exit);
    }

    #[test]
    fn test_home_dir_is_resolved() {
        let env = Environment::new();
        let home = env.home_dir().expect("no home directory");
        assert!(home.is_absolute(), "home should be absolute: {:?}", home);
    }
}

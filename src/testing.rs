//! Helpers shared by tests that touch the process working directory.

use std::env as stdenv;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// The working directory is process-wide; tests changing it take this lock.
pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn make_unique_temp_dir(tag: &str) -> io::Result<PathBuf> {
    let mut p = stdenv::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("tshell_test_{}_{}_{}", tag, std::process::id(), nanos));
    fs::create_dir_all(&p)?;
    Ok(p)
}

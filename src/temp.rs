//! Scoped temporary directories for repository checkouts
//!
//! Checkouts never land under the current working directory, even when
//! TMPDIR is relative (e.g. TMPDIR=tmp while running inside a repository
//! that is itself being validated).

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::{Result, ValidateError};

const CHECKOUT_PREFIX: &str = "k8s-validate-";

/// Returns an absolute directory under which temporary checkouts are created
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        return t;
    }
    #[cfg(windows)]
    {
        env::var("TEMP")
            .or_else(|_| env::var("TMP"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}

/// Create a checkout directory that is removed when the guard is dropped
pub fn checkout_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(CHECKOUT_PREFIX)
        .tempdir_in(temp_dir_base())
        .map_err(|e| ValidateError::IoError {
            message: format!("Failed to create temporary checkout directory: {e}"),
        })
}

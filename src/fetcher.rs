//! Repository fetching for repository-mode validation
//!
//! A [`RepoCheckout`] owns the temporary directory holding the clone; the
//! directory is removed when the checkout is dropped, on success and on every
//! early-return path alike.

use std::path::Path;

use tempfile::TempDir;

use crate::discovery::discover_manifests;
use crate::domain::ManifestFile;
use crate::error::{Result, ValidateError};
use crate::git;
use crate::temp;

/// Repository location to validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSource {
    pub url: String,
    pub branch: String,
}

impl RepoSource {
    pub fn new(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
        }
    }
}

/// A cloned branch living in a scoped temporary directory
#[derive(Debug)]
pub struct RepoCheckout {
    dir: TempDir,
    source: RepoSource,
}

impl RepoCheckout {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Manifests found in the checkout
    ///
    /// An empty result is reported as [`ValidateError::NoManifestFiles`] so the
    /// caller can exit with the dedicated status.
    pub fn manifests(&self) -> Result<Vec<ManifestFile>> {
        let files = discover_manifests(self.root());
        if files.is_empty() {
            return Err(ValidateError::NoManifestFiles {
                location: format!(
                    "{} (branch {})",
                    git::url::display_url(&self.source.url),
                    self.source.branch
                ),
            });
        }
        Ok(files)
    }
}

/// Clone `source` into a fresh temporary directory
pub fn fetch(source: &RepoSource) -> Result<RepoCheckout> {
    let dir = temp::checkout_dir()?;
    tracing::info!(url = %source.url, branch = %source.branch, "fetching repository");
    git::clone_branch(&source.url, &source.branch, dir.path())?;
    Ok(RepoCheckout {
        dir,
        source: source.clone(),
    })
}

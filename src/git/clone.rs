//! Branch clones into a target directory

use std::path::Path;

use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks, Repository};

use super::auth::setup_auth_callbacks;
use super::error::clone_error;
use super::url::{clone_url, is_local};
use crate::error::Result;

/// Clone `branch` of `url` into `target`
///
/// Remote clones are shallow (depth 1); local paths and `file://` URLs are
/// cloned in full because libgit2 has no shallow support for them.
pub fn clone_branch(url: &str, branch: &str, target: &Path) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if !is_local(url) {
        fetch_options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    builder.branch(branch);

    let source = clone_url(url);
    tracing::debug!(url = %source, branch, target = %target.display(), "cloning repository");

    builder
        .clone(source.as_ref(), target)
        .map_err(|e| clone_error(url, branch, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidateError;
    use tempfile::TempDir;

    fn repo_with_commit_on(branch: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("app.yaml"), "kind: Pod\n").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("app.yaml")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let refname = format!("refs/heads/{branch}");
        repo.commit(Some(&refname), &sig, &sig, "init", &tree, &[])
            .unwrap();
        repo.set_head(&refname).unwrap();
        temp
    }

    #[test]
    fn test_clone_local_branch() {
        let source = repo_with_commit_on("main");
        let target = TempDir::new().unwrap();
        let url = source.path().to_string_lossy().to_string();

        let repo = clone_branch(&url, "main", &target.path().join("checkout")).unwrap();
        assert!(repo.workdir().unwrap().join("app.yaml").is_file());
    }

    #[test]
    fn test_clone_missing_branch() {
        let source = repo_with_commit_on("main");
        let target = TempDir::new().unwrap();
        let url = source.path().to_string_lossy().to_string();

        let Err(err) = clone_branch(&url, "does-not-exist", &target.path().join("checkout")) else {
            panic!("clone of a missing branch should fail");
        };
        assert!(matches!(err, ValidateError::BranchNotFound { .. }), "got {err:?}");
    }

    #[test]
    fn test_clone_missing_repository() {
        let target = TempDir::new().unwrap();
        let missing = target.path().join("no-such-repo");

        let Err(err) = clone_branch(&missing.to_string_lossy(), "main", &target.path().join("checkout")) else {
            panic!("clone of a missing repository should fail");
        };
        assert!(matches!(err, ValidateError::GitCloneFailed { .. }), "got {err:?}");
    }
}

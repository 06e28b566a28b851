//! Git operations for repository-mode validation
//!
//! This module handles:
//! - Cloning one branch of a repository (HTTPS, SSH, local paths)
//! - Normalizing URLs for libgit2
//! - Mapping clone failures to fetch errors
//!
//! Authentication is delegated entirely to git's native system:
//! - SSH keys from ~/.ssh/ and the SSH agent
//! - Git credential helpers

mod auth;
mod clone;
mod error;
pub mod url;

pub use clone::clone_branch;

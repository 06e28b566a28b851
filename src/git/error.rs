//! Translation of libgit2 clone failures into fetch errors
//!
//! libgit2 reports most remote failures as free-form messages, so the
//! classification is a keyword table checked in order.

use git2::{Error, ErrorClass, ErrorCode};

use crate::error::ValidateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloneFailure {
    BranchNotFound,
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    Network,
    Certificate,
    Other,
}

type FailureCheck = fn(&str, &Error) -> bool;

const FAILURE_TABLE: &[(FailureCheck, CloneFailure)] = &[
    (
        // RepoBuilder::branch on a missing branch: "reference 'refs/remotes/origin/x' not found"
        |msg, err| {
            err.class() == ErrorClass::Reference
                || (err.code() == ErrorCode::NotFound && msg.contains("refs/"))
                || (msg.contains("remote branch") && msg.contains("not found"))
        },
        CloneFailure::BranchNotFound,
    ),
    (
        |msg, _| {
            msg.contains("not found")
                || msg.contains("404")
                || msg.contains("does not exist")
                || msg.contains("no such file")
                || msg.contains("could not find repository")
                || msg.contains("too many redirects")
                || msg.contains("authentication replays")
        },
        CloneFailure::RepositoryNotFound,
    ),
    (
        |msg, _| msg.contains("authentication") || msg.contains("credentials"),
        CloneFailure::AuthenticationFailed,
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        CloneFailure::PermissionDenied,
    ),
    (
        |msg, _| {
            msg.contains("connection")
                || msg.contains("network")
                || msg.contains("resolve")
                || msg.contains("timed out")
                || msg.contains("timeout")
        },
        CloneFailure::Network,
    ),
    (
        |msg, err| err.class() == ErrorClass::Http && (msg.contains("certificate") || msg.contains("ssl")),
        CloneFailure::Certificate,
    ),
];

fn classify(err: &Error) -> CloneFailure {
    let msg = err.message().to_lowercase();
    FAILURE_TABLE
        .iter()
        .find(|(check, _)| check(&msg, err))
        .map_or(CloneFailure::Other, |(_, failure)| *failure)
}

/// Convert a failed clone into the matching fetch error
pub fn clone_error(url: &str, branch: &str, err: &Error) -> ValidateError {
    let reason = match classify(err) {
        CloneFailure::BranchNotFound => {
            return ValidateError::BranchNotFound {
                url: url.to_string(),
                branch: branch.to_string(),
            };
        }
        CloneFailure::RepositoryNotFound => "Repository not found".to_string(),
        CloneFailure::AuthenticationFailed => "Authentication failed".to_string(),
        CloneFailure::PermissionDenied => "Permission denied".to_string(),
        CloneFailure::Network => format!("Network error: {}", err.message()),
        CloneFailure::Certificate => format!("TLS error: {}", err.message()),
        CloneFailure::Other => err.message().to_string(),
    };
    ValidateError::GitCloneFailed {
        url: url.to_string(),
        reason,
    }
}

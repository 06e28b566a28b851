//! Repository URL handling for libgit2
//!
//! - SCP-style SSH URLs (`git@host:path`) become `ssh://git@host/path`
//! - `file://` URLs get the triple slash libgit2 expects on Unix
//! - local paths and `file://` URLs are recognised so shallow fetches can be
//!   skipped for them (libgit2 does not support depth on local transports)

use std::borrow::Cow;
use std::path::Path;

/// True for `file://` URLs and absolute filesystem paths
pub fn is_local(url: &str) -> bool {
    url.starts_with("file://") || url.starts_with('/') || Path::new(url).is_absolute()
}

/// Rewrite a user-supplied URL into a form libgit2 clones reliably
pub fn clone_url(url: &str) -> Cow<'_, str> {
    if let Some(rest) = url.strip_prefix("git@") {
        return match rest.split_once(':') {
            Some((host, path)) => {
                let path = path.trim_start_matches('/');
                Cow::Owned(format!("ssh://git@{host}/{path}"))
            }
            None => Cow::Borrowed(url),
        };
    }

    #[cfg(not(windows))]
    if let Some(after) = url.strip_prefix("file://") {
        if after.contains('\\') {
            return Cow::Owned(format!("file:///{}", after.replace('\\', "/")));
        }
        if !after.is_empty() && !after.starts_with('/') {
            return Cow::Owned(format!("file:///{after}"));
        }
    }

    Cow::Borrowed(url)
}

/// Repository URL without a trailing `.git`, for display in reports
pub fn display_url(url: &str) -> &str {
    url.strip_suffix(".git").unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scp_style_ssh_is_rewritten() {
        assert_eq!(
            clone_url("git@github.com:org/manifests.git"),
            "ssh://git@github.com/org/manifests.git"
        );
        assert_eq!(
            clone_url("git@gitlab.example.com:/group/repo.git"),
            "ssh://git@gitlab.example.com/group/repo.git"
        );
    }

    #[test]
    fn test_https_and_ssh_urls_untouched() {
        let https = "https://github.com/org/manifests.git";
        assert!(matches!(clone_url(https), Cow::Borrowed(_)));
        assert_eq!(clone_url("ssh://git@host/repo.git"), "ssh://git@host/repo.git");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_file_urls_get_absolute_form() {
        assert_eq!(clone_url("file://tmp/repo"), "file:///tmp/repo");
        assert_eq!(clone_url("file:///tmp/repo"), "file:///tmp/repo");
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("file:///tmp/repo"));
        assert!(is_local("/srv/git/repo"));
        assert!(!is_local("https://github.com/org/repo.git"));
        assert!(!is_local("git@github.com:org/repo.git"));
    }

    #[test]
    fn test_display_url() {
        assert_eq!(
            display_url("https://github.com/org/repo.git"),
            "https://github.com/org/repo"
        );
        assert_eq!(display_url("/srv/repo"), "/srv/repo");
    }
}

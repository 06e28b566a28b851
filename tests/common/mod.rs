//! Common test utilities for k8s-validate integration tests
//!
//! The validators are replaced by small shell scripts that mimic the JSON
//! output of kubeconform and kube-linter, driven by marker words in the
//! manifest content:
//! - `INVALID` makes kubeconform report a schema error
//! - `LATEST` makes kube-linter report a latest-tag warning
//! - `CRASH` makes kubeconform die from a signal

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const VALID_MANIFEST: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: 1\n";
pub const INVALID_MANIFEST: &str =
    "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  labels:\n    note: INVALID\nspec:\n  replicas: \"one\"\n";
pub const LATEST_MANIFEST: &str =
    "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\n  labels:\n    note: LATEST\nspec:\n  containers: []\n";
pub const CRASH_MANIFEST: &str = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: CRASH\n";

const FAKE_KUBECONFORM: &str = r#"#!/bin/sh
if [ "$1" = "-v" ]; then echo "v0.6.7"; exit 0; fi
for arg in "$@"; do
  case "$arg" in
    *.yaml|*.yml) if grep -q CRASH "$arg"; then kill -9 $$; fi ;;
  esac
done
printf '{"resources":['
sep=""
status=0
for arg in "$@"; do
  case "$arg" in
    *.yaml|*.yml)
      if grep -q INVALID "$arg"; then
        printf '%s{"filename":"%s","kind":"Deployment","name":"web","version":"apps/v1","status":"statusInvalid","msg":"problem validating schema","validationErrors":[{"path":"/spec/replicas","msg":"expected integer, but got string"}]}' "$sep" "$arg"
        status=1
      else
        printf '%s{"filename":"%s","kind":"Deployment","name":"web","version":"apps/v1","status":"statusValid","msg":""}' "$sep" "$arg"
      fi
      sep=","
      ;;
  esac
done
printf ']}\n'
exit $status
"#;

const FAKE_KUBE_LINTER: &str = r#"#!/bin/sh
if [ "$1" = "version" ]; then echo "0.7.1"; exit 0; fi
printf '{"Reports":['
sep=""
status=0
for arg in "$@"; do
  case "$arg" in
    *.yaml|*.yml)
      if grep -q LATEST "$arg"; then
        printf '%s{"Check":"latest-tag","Diagnostic":{"Message":"container web uses an image without a pinned tag"},"Object":{"Metadata":{"FilePath":"%s"}}}' "$sep" "$arg"
        sep=","
        status=1
      fi
      ;;
  esac
done
printf '],"Summary":{"ChecksStatus":"Done"}}\n'
exit $status
"#;

/// Environment variables that would leak host configuration into a run
const HOST_ENV: &[&str] = &[
    "API_KEY",
    "API_URL",
    "MODEL_NAME",
    "AI_TIMEOUT_SECS",
    "REPO_URL",
    "DEFAULT_BRANCH",
    "OUTPUT_FORMAT",
    "REPORT_SEVERITY_LEVEL",
    "KUBECONFORM_SCHEMA_LOCATION",
    "KUBE_LINTER_CONFIG",
    "RUST_LOG",
];

/// A test workspace with fake validator binaries
pub struct TestWorkspace {
    pub temp: TempDir,
    pub path: PathBuf,
    bin: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let bin = path.join(".bin");
        fs::create_dir_all(&bin).expect("Failed to create bin directory");
        write_script(&bin.join("kubeconform"), FAKE_KUBECONFORM);
        write_script(&bin.join("kube-linter"), FAKE_KUBE_LINTER);
        Self { temp, path, bin }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn kubeconform_bin(&self) -> PathBuf {
        self.bin.join("kubeconform")
    }

    pub fn kube_linter_bin(&self) -> PathBuf {
        self.bin.join("kube-linter")
    }

    /// The real binary, isolated from the host environment and using the fake validators
    pub fn cmd(&self) -> Command {
        let mut cmd = k8s_validate_cmd();
        for key in HOST_ENV {
            cmd.env_remove(key);
        }
        cmd.current_dir(&self.path)
            .env("KUBECONFORM_BIN", self.kubeconform_bin())
            .env("KUBE_LINTER_BIN", self.kube_linter_bin())
            .arg("--quiet");
        cmd
    }
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn k8s_validate_cmd() -> Command {
    Command::cargo_bin("k8s-validate").unwrap()
}

fn write_script(path: &Path, content: &str) {
    fs::write(path, content).expect("Failed to write script");
    let mut perms = fs::metadata(path).expect("Failed to stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to chmod script");
}

/// Create a git repository with one commit on `branch` containing `files`
pub fn init_git_repo(root: &Path, branch: &str, files: &[(&str, &str)]) {
    let repo = git2::Repository::init(root).expect("Failed to init repository");
    let mut index = repo.index().expect("Failed to open index");
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        index.add_path(Path::new(rel)).expect("Failed to stage file");
    }
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let sig = git2::Signature::now("Test", "test@example.com").expect("Failed to create signature");
    let refname = format!("refs/heads/{branch}");
    repo.commit(Some(&refname), &sig, &sig, "init", &tree, &[])
        .expect("Failed to commit");
    repo.set_head(&refname).expect("Failed to set HEAD");
}

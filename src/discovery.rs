//! Manifest discovery
//!
//! This module handles:
//! - Walking a checkout for `.yaml`/`.yml` files (skipping `.git/`)
//! - Deciding whether a YAML file looks like a Kubernetes manifest
//! - De-duplicating explicit file lists in local mode
//!
//! The manifest check is a heuristic, not a parse: a file qualifies when any
//! YAML document in it is a mapping with `apiVersion` and `kind`, or when at
//! least two Kubernetes indicators appear in its text (templated files such
//! as Helm charts are not valid YAML but still match the indicators).

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};

use crate::domain::ManifestFile;

/// Files larger than this are never treated as manifests
const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

const K8S_INDICATORS: &[&str] = &[
    "apiversion:",
    "kind:",
    "metadata:",
    "spec:",
    "deployment",
    "service",
    "pod",
    "configmap",
    "secret",
    "ingress",
    "statefulset",
    "daemonset",
    "job",
    "cronjob",
    "persistentvolume",
    "namespace",
];

const MIN_INDICATORS: usize = 2;

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| YAML_EXTENSIONS.iter().any(|y| e.eq_ignore_ascii_case(y)))
}

fn has_resource_document(content: &str) -> bool {
    serde_yaml::Deserializer::from_str(content)
        .map_while(|doc| serde_yaml::Value::deserialize(doc).ok())
        .any(|value| {
            value.get("apiVersion").is_some_and(serde_yaml::Value::is_string)
                && value.get("kind").is_some_and(serde_yaml::Value::is_string)
        })
}

fn indicator_count(content: &str) -> usize {
    let lower = content.to_lowercase();
    K8S_INDICATORS
        .iter()
        .filter(|indicator| lower.contains(*indicator))
        .count()
}

/// Whether YAML text looks like a Kubernetes resource
pub fn looks_like_manifest(content: &str) -> bool {
    has_resource_document(content) || indicator_count(content) >= MIN_INDICATORS
}

fn is_manifest_file(path: &Path) -> bool {
    let small_enough = fs::metadata(path).is_ok_and(|m| m.len() <= MAX_MANIFEST_BYTES);
    if !small_enough {
        return false;
    }
    match fs::read_to_string(path) {
        Ok(content) => looks_like_manifest(&content),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
            false
        }
    }
}

/// Find every manifest under `root`, sorted by path
pub fn discover_manifests(root: &Path) -> Vec<ManifestFile> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_git_dir(e))
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && has_yaml_extension(e.path()))
        .map(DirEntry::into_path)
        .filter(|p| is_manifest_file(p))
        .collect();
    paths.sort();

    tracing::debug!(root = %root.display(), count = paths.len(), "discovered manifests");
    paths
        .into_iter()
        .map(|p| ManifestFile::relative_to(p, root))
        .collect()
}

/// Turn an explicit file list into manifest files, keeping the first occurrence of each path
///
/// `./a.yaml` and `a.yaml` name the same file; the first spelling is kept.
pub fn local_manifests(paths: &[PathBuf]) -> Vec<ManifestFile> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .filter(|p| seen.insert(dedupe_key(p)))
        .map(|p| ManifestFile::new(p.clone()))
        .collect()
}

fn dedupe_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

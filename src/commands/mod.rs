//! Command implementations for the k8s-validate CLI

pub mod validate;

use std::env;
use std::path::{Path, PathBuf};

use path_slash::PathExt;

use crate::error::CobertaError;

pub const SOURCE_ROOTS_ENV: &str = "COBERTA_SOURCE_ROOTS";

// Roots searched for the files named in the report, in order. These are also
// what the report's <sources> element lists.
pub fn source_roots() -> Vec<PathBuf> {
    let configured = env::var_os(SOURCE_ROOTS_ENV)
        .map(|raw| env::split_paths(&raw).collect::<Vec<_>>())
        .unwrap_or_default();
    if configured.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        configured
    }
}

pub fn root_names(roots: &[PathBuf]) -> Vec<String> {
    roots
        .iter()
        .map(|root| root.to_slash_lossy().to_string())
        .collect()
}

pub fn find_file(file_name: &str, roots: &[PathBuf]) -> Result<PathBuf, CobertaError> {
    // A leading underscore marks a build-tag-excluded file in the report.
    let name = file_name.strip_prefix('_').unwrap_or(file_name);
    let as_given = Path::new(name);
    if as_given.exists() {
        return Ok(as_given.to_path_buf());
    }
    roots
        .iter()
        .map(|root| root.join(as_given))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| CobertaError::FileNotFound {
            file: file_name.to_string(),
        })
}

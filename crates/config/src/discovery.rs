// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Glob-based discovery of pipeline documents on disk (spec §4.5
//! "Loading", §6 "Glob semantics").

use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Enumerate every path matched by any of `patterns`, deduplicated and
/// sorted for deterministic startup ordering.
pub fn discover(patterns: &[String]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut paths = BTreeSet::new();
    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|source| ConfigError::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            paths.insert(entry);
        }
    }
    Ok(paths.into_iter().collect())
}

/// A pipeline's name is its file's basename with the extension stripped
/// (spec §4.5: "name = basename stripped of extension").
pub fn pipeline_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn pipeline_name_strips_extension() {
        assert_eq!(pipeline_name_for(Path::new("/etc/logshipper/web.yaml")), "web");
        assert_eq!(pipeline_name_for(Path::new("web.yml")), "web");
    }

    #[test]
    fn discover_finds_glob_matches_deterministically() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.yaml"), "steps: []").unwrap();
        fs::write(dir.path().join("a.yaml"), "steps: []").unwrap();
        fs::write(dir.path().join("ignore.txt"), "").unwrap();

        let pattern = dir.path().join("*.yaml").to_string_lossy().into_owned();
        let found = discover(&[pattern]).unwrap();

        let names: Vec<String> = found.iter().map(|p| pipeline_name_for(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}

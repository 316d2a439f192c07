//! Bounded filesystem walks, used as a fallback when an external tool or
//! cache is unavailable (the code symbol index's filesystem-scan fallback).

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Walk `root`, returning at most `cap` regular file paths, skipping common
/// non-source directories (`.git`, `target`, `node_modules`).
#[must_use]
pub fn capped_file_walk(root: &Path, cap: usize) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| match e.file_name().to_str() {
            Some(name) => !matches!(name, ".git" | "target" | "node_modules"),
            None => true,
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .take(cap)
        .map(|e| e.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn walk_respects_cap() {
        let dir = tempdir().unwrap();
        for i in 0..10 {
            fs::write(dir.path().join(format!("f{i}.rs")), "fn main() {}").unwrap();
        }
        let found = capped_file_walk(dir.path(), 3);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn walk_skips_git_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(dir.path().join("lib.rs"), "fn main() {}").unwrap();
        let found = capped_file_walk(dir.path(), 100);
        assert_eq!(found.len(), 1);
    }
}

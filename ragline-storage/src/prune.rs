//! LRU-by-mtime pruning of a directory, used by the query cache's
//! `max_entries` eviction.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Keep at most `max_entries` files directly under `dir` (matched against
/// `extension`), deleting the least-recently-modified ones first. Returns
/// the number of files deleted.
pub fn prune_by_mtime(dir: &Path, extension: &str, max_entries: usize) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == extension)
        })
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().ok()?;
            Some((e.path(), modified))
        })
        .collect();

    if entries.len() <= max_entries {
        return Ok(0);
    }

    entries.sort_by_key(|(_, modified)| std::cmp::Reverse(*modified));
    let mut deleted = 0;
    for (path, _) in entries.into_iter().skip(max_entries) {
        if fs::remove_file(&path).is_ok() {
            deleted += 1;
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn prune_keeps_most_recently_modified() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("{i}.json")), "{}").unwrap();
            sleep(Duration::from_millis(5));
        }
        let deleted = prune_by_mtime(dir.path(), "json", 2).unwrap();
        assert_eq!(deleted, 3);
        let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(remaining.len(), 2);
        assert!(dir.path().join("4.json").exists());
        assert!(dir.path().join("3.json").exists());
    }

    #[test]
    fn prune_no_op_under_limit() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("0.json"), "{}").unwrap();
        let deleted = prune_by_mtime(dir.path(), "json", 10).unwrap();
        assert_eq!(deleted, 0);
    }

    #[test]
    fn prune_missing_directory_is_a_no_op() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert_eq!(prune_by_mtime(&missing, "json", 1).unwrap(), 0);
    }
}

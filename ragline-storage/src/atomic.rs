//! Atomic JSON writes and locked appends.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Registry of per-path locks, so concurrent writers to the *same* file
/// within one process serialize, while writers to different files don't
/// contend. Sufficient for the single-process deployment the spec assumes;
/// multi-process callers rely on the write-then-rename being atomic at the
/// OS level regardless.
static PATH_LOCKS: Mutex<Option<HashMap<PathBuf, Arc<Mutex<()>>>>> = Mutex::new(None);

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let mut registry = PATH_LOCKS.lock();
    let map = registry.get_or_insert_with(HashMap::new);
    map.entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Serialize `value` as JSON and write it to `path`, writing to a sibling
/// `.tmp` file first and renaming over the destination so readers never
/// observe a partial write.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let lock = lock_for(path);
    let _guard = lock.lock();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp_path, body)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read and deserialize JSON from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Append one line (newline-terminated) to `path`, creating it if absent,
/// under this process's per-path lock.
pub fn append_line(path: &Path, line: &str) -> Result<()> {
    use std::io::Write;

    let lock = lock_for(path);
    let _guard = lock.lock();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.json");
        write_json_atomic(&path, &json!({"a": 1})).unwrap();
        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn write_leaves_no_tmp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.json");
        write_json_atomic(&path, &json!({"a": 1})).unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn append_line_creates_file_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        append_line(&path, "{\"a\":1}").unwrap();
        append_line(&path, "{\"a\":2}").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}

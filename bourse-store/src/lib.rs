//! Durable whole-file storage for the catalog table and each replica's
//! ledger. Every write rewrites the entire file atomically (temp file,
//! `sync_all`, rename) rather than append in place — the state these two
//! components persist is small enough that there's no benefit to anything
//! more incremental, and atomic-rewrite means a crash mid-write can never
//! leave a half-written file behind.

mod ioutil;

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use bourse_base::{Error, Result};

/// A durable, whole-file-rewrite store for a single serializable value `T`
/// (the catalog's instrument table, or one replica's ledger snapshot).
pub struct FileStore<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> FileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into(), _marker: PhantomData }
    }

    /// Loads the current value, or `T::default()` if the file doesn't
    /// exist yet (first boot).
    pub fn load_or_default(&self) -> Result<T> {
        match fs::read(&self.path) {
            Ok(bytes) => rmp_serde::from_slice(&bytes)
                .map_err(|e| Error::internal(format!("corrupt store at {}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no existing store file, starting empty");
                Ok(T::default())
            }
            Err(e) => Err(Error::internal(format!("reading {}: {e}", self.path.display()))),
        }
    }

    /// Serializes `value` and atomically replaces the store file's
    /// contents: write to a sibling temp file, flush and sync it, then
    /// rename over the target. A crash at any point before the rename
    /// leaves the previous file intact.
    pub fn save(&self, value: &T) -> Result<()> {
        let bytes = rmp_serde::to_vec(value)
            .map_err(|e| Error::internal(format!("encoding store: {e}")))?;
        let tmp_path = tmp_path_for(&self.path);
        write_atomic(&tmp_path, &self.path, &bytes)
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn write_atomic(tmp_path: &Path, final_path: &Path, bytes: &[u8]) -> Result<()> {
    use ioutil::Writer as _;

    let mut writer = ioutil::FileWriter::try_create_fresh(tmp_path.to_owned())
        .map_err(|e| Error::internal(format!("creating {}: {e}", tmp_path.display())))?;
    writer
        .write_all(bytes)
        .map_err(|e| Error::internal(format!("writing {}: {e}", tmp_path.display())))?;
    let _reader = writer
        .try_into_reader()
        .map_err(|e| Error::internal(format!("syncing {}: {e}", tmp_path.display())))?;
    fs::rename(tmp_path, final_path)
        .map_err(|e| Error::internal(format!("renaming into {}: {e}", final_path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use test_log::test;

    #[test]
    fn load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store: FileStore<BTreeMap<String, i64>> = FileStore::new(dir.path().join("missing.db"));
        let loaded = store.load_or_default().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store: FileStore<BTreeMap<String, i64>> = FileStore::new(dir.path().join("state.db"));
        let mut value = BTreeMap::new();
        value.insert("AAA".to_string(), 10);
        store.save(&value).unwrap();
        let loaded = store.load_or_default().unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn save_is_atomic_no_tmp_file_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        let store: FileStore<BTreeMap<String, i64>> = FileStore::new(&path);
        store.save(&BTreeMap::new()).unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn repeated_saves_overwrite_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store: FileStore<BTreeMap<String, i64>> = FileStore::new(dir.path().join("state.db"));
        let mut value = BTreeMap::new();
        value.insert("AAA".to_string(), 1);
        store.save(&value).unwrap();
        value.insert("BBB".to_string(), 2);
        store.save(&value).unwrap();
        assert_eq!(store.load_or_default().unwrap(), value);
    }
}

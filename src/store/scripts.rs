//! Named script storage: one file per script id.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};

use super::{is_valid_id, ScriptSource};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct ScriptStore {
    storage_path: PathBuf,
}

impl ScriptStore {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.scripts_path())
    }

    fn file_path(&self, id: &str) -> PathBuf {
        self.storage_path.join(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        is_valid_id(id) && self.file_path(id).is_file()
    }

    pub fn write(&self, id: &str, content: &str) -> Result<PathBuf> {
        if !is_valid_id(id) {
            bail!("invalid script id: {:?}", id);
        }
        fs::create_dir_all(&self.storage_path).with_context(|| {
            format!("creating script storage: {}", self.storage_path.display())
        })?;
        let p = self.file_path(id);
        fs::write(&p, content).with_context(|| format!("writing script: {}", p.display()))?;
        Ok(p)
    }

    /// Returns whether a script was removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        if !self.exists(id) {
            return Ok(false);
        }
        let p = self.file_path(id);
        fs::remove_file(&p).with_context(|| format!("removing script: {}", p.display()))?;
        Ok(true)
    }

    /// Stored ids, sorted by name.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.storage_path.exists() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<String> = fs::read_dir(&self.storage_path)
            .with_context(|| format!("listing scripts: {}", self.storage_path.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl ScriptSource for ScriptStore {
    fn get_executable_source(&self, id: &str) -> Result<Option<String>> {
        if !self.exists(id) {
            return Ok(None);
        }
        let p = self.file_path(id);
        let text = fs::read_to_string(&p).with_context(|| format!("reading script: {}", p.display()))?;
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(dir.path().join("scripts"));
        store.write("hello.py", "print('hello')\n").unwrap();

        assert!(store.exists("hello.py"));
        assert_eq!(
            store.get_executable_source("hello.py").unwrap().as_deref(),
            Some("print('hello')\n")
        );
        assert_eq!(store.get_executable_source("other.py").unwrap(), None);
    }

    #[test]
    fn traversal_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("outside"), "x").unwrap();
        let store = ScriptStore::new(dir.path().join("scripts"));
        store.write("inside", "y").unwrap();

        assert_eq!(store.get_executable_source("../outside").unwrap(), None);
        assert!(store.write("../outside", "z").is_err());
        assert_eq!(fs::read_to_string(dir.path().join("outside")).unwrap(), "x");
    }

    #[test]
    fn list_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());
        store.write("b", "").unwrap();
        store.write("a", "").unwrap();
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.list().unwrap(), vec!["b"]);
    }
}

//! Durable key/value cache holding the serialized tier board.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use super::CacheError;

/// Fixed namespaced key under which the board is cached.
pub const CACHE_KEY: &str = "chiv2_tier_list";

/// String key/value storage surviving restarts.
pub trait BoardCache {
    /// Read the raw value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Store `value` under `key`, replacing any previous value.
    fn store(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Cache keeping one `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Cache rooted at `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BoardCache for FileCache {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write then rename so a crash never leaves a half-written entry.
        let path = self.entry_path(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|source| CacheError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            CacheError::Io { path, source }
        })
    }
}

/// In-process cache, mostly useful in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with a raw value.
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut cache = Self::default();
        cache.entries.insert(key.to_owned(), value.into());
        cache
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of successful `store` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl BoardCache for MemoryCache {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_cache_misses_then_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path().join("nested"));

        assert_eq!(cache.load(CACHE_KEY).unwrap(), None);

        cache.store(CACHE_KEY, "{}").unwrap();
        cache.store(CACHE_KEY, r#"{"1":["Anka"]}"#).unwrap();
        assert_eq!(
            cache.load(CACHE_KEY).unwrap().as_deref(),
            Some(r#"{"1":["Anka"]}"#)
        );
        assert!(dir.path().join("nested/chiv2_tier_list.json").exists());
    }

    #[test]
    fn failed_rename_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory squatting on the entry path makes the rename fail.
        let blocker = dir.path().join(format!("{CACHE_KEY}.json"));
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let mut cache = FileCache::new(dir.path());
        let err = cache.store(CACHE_KEY, "{}").unwrap_err();

        assert!(matches!(err, CacheError::Io { ref path, .. } if path == &blocker));
        assert!(!dir.path().join(format!("{CACHE_KEY}.json.tmp")).exists());
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::{LoadError, Result};
use super::loader;
use super::model::Dataset;

/// Identity of a file on disk at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl CacheKey {
    fn for_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io(e),
        })?;
        let path = std::fs::canonicalize(path)?;
        Ok(CacheKey {
            path,
            modified: meta.modified().ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// DatasetCache – load once, reuse many
// ---------------------------------------------------------------------------

/// Memoizes [`loader::load_file`].
///
/// Entries are keyed by canonical path and modification time: asking again
/// for an unchanged file returns the same `Arc` without touching its
/// contents. A rewritten file gets a new key and is read again, replacing
/// the stale entry for that path. [`DatasetCache::clear`] drops everything.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<CacheKey, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `path`, reading the file only on a miss.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let key = CacheKey::for_path(path)?;
        if let Some(ds) = self.entries.get(&key) {
            log::debug!("dataset cache hit for {}", key.path.display());
            return Ok(Arc::clone(ds));
        }

        let dataset = Arc::new(loader::load_file(path)?);
        log::info!(
            "Loaded {} tracks ({} years, {} genres) from {}",
            dataset.len(),
            dataset.years.len(),
            dataset.genres.len(),
            key.path.display()
        );
        self.entries.retain(|cached, _| cached.path != key.path);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget every cached dataset.
    pub fn clear(&mut self) {
        log::debug!("clearing {} cached dataset(s)", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
year,genre,popularity,key_chord_notation,tonality,short_key_tonality,key_relative_notation,instrumentalness,valence
2000,pop,50,C,Major,C,C/Am,0.1,0.8
2001,rock,20,E,Minor,Em,G/Em,0.3,0.1
";

    #[test]
    fn second_load_reuses_the_same_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_forces_a_reread_with_equal_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.load(&path).unwrap();
        cache.clear();
        assert_eq!(cache.len(), 0);

        let reread = cache.load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &reread));
        assert_eq!(*first, *reread);
    }

    #[test]
    fn rewritten_file_replaces_its_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.csv");
        let other = dir.path().join("other.csv");
        std::fs::write(&other, CSV).unwrap();

        let mut cache = DatasetCache::new();
        cache.load(&other).unwrap();

        let epoch = SystemTime::UNIX_EPOCH;
        let mut previous = None;
        for day in 1..=3u64 {
            std::fs::write(&path, CSV).unwrap();
            std::fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(epoch + std::time::Duration::from_secs(day * 86_400))
                .unwrap();

            let loaded = cache.load(&path).unwrap();
            if let Some(prev) = &previous {
                assert!(!Arc::ptr_eq(prev, &loaded));
            }
            previous = Some(loaded);
            assert_eq!(cache.len(), 2);
        }
    }

    #[test]
    fn missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new();
        let err = cache.load(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn failed_parse_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "year,genre\n2000,pop\n").unwrap();

        let mut cache = DatasetCache::new();
        assert!(cache.load(&path).is_err());
        assert_eq!(cache.len(), 0);
    }
}

//! Keyed dataset cache.
//!
//! RULES:
//!   - One read per distinct path for the life of the cache.
//!   - A failed load caches an empty dataset; the session stays in the
//!     load-failed state for that path until invalidate() is called.
//!   - Cached datasets are shared read-only through Arc.

use crate::{error::DashResult, record::Dataset};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A load that failed, reported once to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

struct Entry {
    dataset: Arc<Dataset>,
    failure: Option<LoadFailure>,
}

/// Path → dataset cache with an explicit loader function.
pub struct DatasetCache<F> {
    loader: F,
    entries: HashMap<PathBuf, Entry>,
    loads: u64,
}

impl<F> DatasetCache<F>
where
    F: FnMut(&Path) -> DashResult<Dataset>,
{
    pub fn new(loader: F) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
            loads: 0,
        }
    }

    /// Cached dataset for `path`, loading it on first access.
    /// Never fails: a load error yields an empty dataset.
    pub fn get_or_load(&mut self, path: &Path) -> Arc<Dataset> {
        if let Some(entry) = self.entries.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Arc::clone(&entry.dataset);
        }

        self.loads += 1;
        let entry = match (self.loader)(path) {
            Ok(dataset) => Entry {
                dataset: Arc::new(dataset),
                failure: None,
            },
            Err(e) => {
                log::error!("Critical error loading {}: {e}", path.display());
                Entry {
                    dataset: Arc::new(Dataset::empty()),
                    failure: Some(LoadFailure {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }),
                }
            }
        };
        let dataset = Arc::clone(&entry.dataset);
        self.entries.insert(path.to_path_buf(), entry);
        dataset
    }

    /// The failure recorded for `path`, if its load failed.
    pub fn failure(&self, path: &Path) -> Option<&LoadFailure> {
        self.entries.get(path).and_then(|e| e.failure.as_ref())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Drop the entry for `path`. Returns true if one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let removed = self.entries.remove(path).is_some();
        if removed {
            log::info!("cache invalidated for {}", path.display());
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of times the loader actually ran.
    pub fn load_count(&self) -> u64 {
        self.loads
    }
}

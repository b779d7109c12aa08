use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::{load_file, LoadError};
use super::model::AppointmentDataset;

/// Memoizes the last loaded dataset, keyed by path and modification time.
///
/// Owned by the caller; a second `get_or_load` for an unchanged file returns
/// the same `Arc` without touching the CSV again.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    dataset: Arc<AppointmentDataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<AppointmentDataset>, LoadError> {
        let modified = match std::fs::metadata(path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.invalidate();
                return Err(LoadError::SourceMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(entry) = &self.entry {
            if entry.path == path && entry.modified == modified {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        self.invalidate();
        let dataset = Arc::new(load_file(path)?);
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            modified,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

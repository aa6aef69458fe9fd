//! Per-dataset annotation files.
//!
//! Each dataset owns `{dir}/{dataset}.json`, a JSON array in insertion
//! order. Appends rewrite the whole file under a per-dataset mutex, so
//! requests inside this process never lose each other's writes. A second
//! process writing the same directory can still race (last writer wins).

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use shared::Annotation;

use crate::error::GalleryError;

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AnnotationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn path_for(&self, dataset: &str) -> PathBuf {
        self.dir.join(format!("{}.json", dataset))
    }

    /// Persisted annotations, or empty when the file is absent or corrupt.
    pub fn get(&self, dataset: &str) -> Vec<Annotation> {
        let lock = self.dataset_lock(dataset);
        let _guard = acquire(&lock);
        self.load(dataset)
    }

    pub fn append(&self, dataset: &str, annotation: Option<Annotation>) -> Result<(), GalleryError> {
        let annotation = annotation
            .ok_or_else(|| GalleryError::InvalidInput("Invalid annotation data".to_string()))?;

        let lock = self.dataset_lock(dataset);
        let _guard = acquire(&lock);

        fs::create_dir_all(&self.dir)?;
        let mut annotations = self.load(dataset);
        annotations.push(annotation);
        let json = serde_json::to_string_pretty(&annotations).map_err(serialization_failure)?;
        fs::write(self.path_for(dataset), json)?;

        tracing::info!("dataset={} annotations={}", dataset, annotations.len());
        Ok(())
    }

    fn load(&self, dataset: &str) -> Vec<Annotation> {
        let path = self.path_for(dataset);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::debug!("treating corrupt {} as empty: {}", path.display(), e);
            Vec::new()
        })
    }

    fn dataset_lock(&self, dataset: &str) -> Arc<Mutex<()>> {
        let mut locks = acquire(&self.locks);
        locks.entry(dataset.to_string()).or_default().clone()
    }
}

// Encoding our own records is a server fault, never a bad request.
fn serialization_failure(e: serde_json::Error) -> GalleryError {
    GalleryError::Storage(std::io::Error::other(e))
}

// Poisoning is ignored: every call re-reads the file from disk.
fn acquire<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

use std::fs;
use std::path::{Path, PathBuf};

/// Enumerates completed tile pyramids under a root directory.
#[derive(Debug, Clone)]
pub struct DatasetLister {
    root: PathBuf,
    manifest_name: String,
}

impl DatasetLister {
    pub fn new(root: impl Into<PathBuf>, manifest_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            manifest_name: manifest_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted names of sub-directories that contain the manifest file.
    ///
    /// A missing or unreadable root yields an empty list.
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cannot read tiles root {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter(|entry| entry.path().join(&self.manifest_name).is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Allow-list check: only names produced by [`list`](Self::list) are
    /// ever turned into filesystem paths.
    pub fn contains(&self, name: &str) -> bool {
        self.list().iter().any(|n| n == name)
    }

    pub fn manifest_url(&self, name: &str) -> String {
        format!(
            "/static/tiles/{}/{}",
            urlencoding::encode(name),
            urlencoding::encode(&self.manifest_name)
        )
    }
}

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::command::AssetSink;

/// A file to copy into the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCopy {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Files registered for copying during a build.
///
/// Registering the same pair twice keeps a single entry.
#[derive(Debug, Default)]
pub struct AssetList {
    files: Mutex<Vec<AssetCopy>>,
}

impl AssetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn files(&self) -> Vec<AssetCopy> {
        self.lock().clone()
    }

    /// Copy every registered file whose source is newer than its destination,
    /// or every file when `force` is set. Returns the number of files copied.
    ///
    /// Failures are logged and skipped.
    pub fn copy_all(&self, force: bool) -> usize {
        let mut copied = 0;
        for file in self.files() {
            if !force && !is_source_newer(&file.source, &file.dest) {
                tracing::debug!(source = %file.source.display(), "asset up to date");
                continue;
            }

            match copy_file(&file.source, &file.dest) {
                Ok(()) => {
                    tracing::info!(source = %file.source.display(), "copied asset");
                    copied += 1;
                }
                Err(e) => tracing::warn!(
                    source = %file.source.display(),
                    dest = %file.dest.display(),
                    error = %e,
                    "failed to copy asset"
                ),
            }
        }
        copied
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AssetCopy>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AssetSink for AssetList {
    fn register(&self, source: &Path, dest: &Path) {
        let file = AssetCopy {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
        };
        let mut files = self.lock();
        if !files.contains(&file) {
            files.push(file);
        }
    }
}

/// Returns true if either file is missing or `source` was modified after `dest`.
pub fn is_source_newer(source: &Path, dest: &Path) -> bool {
    let modified = |path: &Path| std::fs::metadata(path).and_then(|m| m.modified());
    match (modified(source), modified(dest)) {
        (Ok(source), Ok(dest)) => source > dest,
        _ => true,
    }
}

fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, dest)?;
    Ok(())
}

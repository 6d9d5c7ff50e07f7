//! Local folder walking for imports

use super::paths::{is_hidden_name, is_hidden_path, relative_remote_path};
use crate::etl::Extractor;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A non-hidden local file found under an import root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Absolute location on disk
    pub path: PathBuf,
    /// Location relative to the import root, `/`-separated
    pub remote_path: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, remote_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            remote_path: remote_path.into(),
        }
    }

    pub fn name(&self) -> &str {
        super::base_name(&self.remote_path)
    }
}

/// Lazy, iterative walk over every visible file below a root folder.
///
/// Top-level files are hidden when their name starts with a dot. Deeper
/// entries are hidden when any segment of their relative path is, and hidden
/// folders are never descended into. Symlinks directly under the root are
/// skipped; deeper ones are followed. Entries come in directory-listing
/// order.
pub struct FolderWalker {
    root: PathBuf,
    entries: walkdir::IntoIter,
}

impl FolderWalker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let entries = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(true)
            .into_iter();
        Self { root, entries }
    }
}

impl Iterator for FolderWalker {
    type Item = Result<LocalFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(eyre::Report::new(e).wrap_err(format!(
                        "An error occurred while reading from folder <{}>",
                        self.root.display()
                    ))));
                }
            };

            let relative = match relative_remote_path(&self.root, entry.path()) {
                Ok(relative) => relative,
                Err(e) => return Some(Err(e)),
            };

            let file_type = entry.file_type();
            if entry.depth() == 1 && entry.path_is_symlink() {
                log::debug!("Skipping symlink {}", relative);
                if file_type.is_dir() {
                    self.entries.skip_current_dir();
                }
                continue;
            }
            if file_type.is_dir() {
                if is_hidden_path(&relative) {
                    log::trace!("Skipping hidden folder {}", relative);
                    self.entries.skip_current_dir();
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let hidden = match entry.depth() {
                1 => is_hidden_name(&relative),
                _ => is_hidden_path(&relative),
            };
            if hidden {
                log::trace!("Skipping hidden file {}", relative);
                continue;
            }

            return Some(Ok(LocalFile::new(entry.into_path(), relative)));
        }
    }
}

/// Read the list of importable files below a folder
pub struct FolderReader {
    path: PathBuf,
}

impl FolderReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Walk the whole folder and collect every visible file
    pub fn read_all(&self) -> Result<Vec<LocalFile>> {
        FolderWalker::new(&self.path).collect()
    }

    /// Count visible files below the folder
    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        for file in FolderWalker::new(&self.path) {
            file?;
            count += 1;
        }
        Ok(count)
    }
}

// The walk is blocking filesystem work, so it runs on the blocking pool
impl Extractor for FolderReader {
    type Item = LocalFile;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || FolderReader::new(path).read_all())
            .await
            .with_context(|| "Folder walk was interrupted")?
    }
}

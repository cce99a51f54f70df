//! Reads and writes whole Automerge documents in a data directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use automerge::AutoCommit;
use rand::distr::{Alphanumeric, SampleString};
use thiserror::Error;
use tracing::trace;

use super::DocType;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a readable document: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Size and modification time of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

/// A data directory holding one file per [`DocType`].
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    dir: PathBuf,
}

impl DocumentStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file(&self, doc_type: DocType) -> PathBuf {
        self.dir.join(doc_type.file_name())
    }

    /// `Ok(None)` when the file has not been written yet.
    pub fn read(&self, doc_type: DocType) -> Result<Option<AutoCommit>, StorageError> {
        let file = self.file(doc_type);
        let bytes = match fs::read(&file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&file)(e)),
        };

        match AutoCommit::load(&bytes) {
            Ok(doc) => {
                trace!(%doc_type, bytes = bytes.len(), "document read");
                Ok(Some(doc))
            }
            Err(e) => Err(StorageError::Corrupt {
                path: file,
                reason: e.to_string(),
            }),
        }
    }

    /// Reads the document, starting empty when there is no file.
    pub fn read_or_default(&self, doc_type: DocType) -> Result<AutoCommit, StorageError> {
        Ok(self.read(doc_type)?.unwrap_or_default())
    }

    /// `Ok(None)` when the file has not been written yet.
    pub fn stamp(&self, doc_type: DocType) -> Result<Option<FileStamp>, StorageError> {
        let file = self.file(doc_type);
        match fs::metadata(&file) {
            Ok(meta) => Ok(Some(FileStamp {
                len: meta.len(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&file)(e)),
        }
    }

    /// Merges the file's changes into `doc`. Returns whether any were new to it.
    pub fn merge_from_disk(
        &self,
        doc_type: DocType,
        doc: &mut AutoCommit,
    ) -> Result<bool, StorageError> {
        let Some(mut on_disk) = self.read(doc_type)? else {
            return Ok(false);
        };
        let applied = doc
            .merge(&mut on_disk)
            .map_err(|e| StorageError::Corrupt {
                path: self.file(doc_type),
                reason: e.to_string(),
            })?;
        if !applied.is_empty() {
            trace!(%doc_type, changes = applied.len(), "merged changes from disk");
        }
        Ok(!applied.is_empty())
    }

    /// Merges the file into `doc`, then writes the merged document back.
    ///
    /// Writers sharing a data directory keep each other's changes this way.
    /// Returns whether the file held changes `doc` had not seen.
    pub fn merge_and_write(
        &self,
        doc_type: DocType,
        doc: &mut AutoCommit,
    ) -> Result<bool, StorageError> {
        let merged = self.merge_from_disk(doc_type, doc)?;
        self.write(doc_type, doc)?;
        Ok(merged)
    }

    /// Replaces the file with the document's full contents.
    ///
    /// The bytes land in a hidden sibling first and are renamed over the file.
    pub fn write(&self, doc_type: DocType, doc: &mut AutoCommit) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let file = self.file(doc_type);
        let suffix = Alphanumeric.sample_string(&mut rand::rng(), 8);
        let staged = self
            .dir
            .join(format!(".{}.{}.tmp", doc_type.file_name(), suffix));
        let bytes = doc.save();
        fs::write(&staged, &bytes).map_err(io_error(&staged))?;
        fs::rename(&staged, &file).map_err(io_error(&file))?;

        trace!(%doc_type, bytes = bytes.len(), "document written");
        Ok(())
    }
}

//! Flat-file persistence for task lists.
//!
//! The whole state of the application is one JSON document of the shape
//! `{ "taskLists": [...] }`. Every load reads the complete file and every
//! save rewrites it; there is no indexing and no partial update.
//!
//! Saves go through a sibling `.tmp` file that is renamed over the target,
//! so a crash mid-write leaves the previous document intact.

use crate::task_list::TaskList;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing the data file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data file (or its directory) could not be read or written.
    #[error("Data file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The data file does not contain a valid document.
    #[error("Data file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted document: every task list, in insertion order.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub task_lists: Vec<TaskList>,
}

/// Loads and saves the whole task list document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the complete document.
    async fn load(&self) -> Result<Document, StoreError>;

    /// Replaces the complete document.
    async fn save(&self, document: &Document) -> Result<(), StoreError>;
}

/// [`DocumentStore`] backed by a single pretty-printed JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating missing parent directories and
    /// seeding an empty document when the file does not exist yet.
    ///
    /// An existing file is left untouched, even if it is malformed; that
    /// surfaces on the first [`DocumentStore::load`].
    #[tracing::instrument(skip(path))]
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };

        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        if !tokio::fs::try_exists(&store.path).await? {
            store.save(&Document::default()).await?;
            tracing::info!("Created empty data file at {}", store.path.display());
        }

        Ok(store)
    }

    /// Location of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name: OsString = self.path.as_os_str().to_owned();
        file_name.push(".tmp");
        PathBuf::from(file_name)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    #[tracing::instrument(skip_all)]
    async fn load(&self) -> Result<Document, StoreError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let document: Document = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded {} task lists", document.task_lists.len());
        Ok(document)
    }

    #[tracing::instrument(skip_all)]
    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(document)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        tracing::debug!("Saved {} task lists", document.task_lists.len());
        Ok(())
    }
}

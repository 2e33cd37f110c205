//! Flat-file (CSV) backend.
//!
//! Every read goes to disk; there is no cache. Writes rewrite the whole file
//! through a temporary sibling and a rename, so a failed write never leaves a
//! truncated store behind. Read-modify-write cycles within one process are
//! serialized by a mutex. Separate processes sharing the same files can still
//! race, and the later writer wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::repository::{GoalRepository, InteractionRepository, Storage, StorageError};

mod goal_repo;
mod interaction_repo;
mod mapping;

pub use mapping::{
    GOAL_HEADER, INTERACTION_HEADER, decode_goals, decode_interactions, encode_goals,
    encode_interactions,
};

pub const INTERACTIONS_FILE: &str = "interazioni_log.csv";
pub const GOALS_FILE: &str = "obiettivi.csv";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlatFileInitError {
    #[error("cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Which store a file holds; decides the header written on initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreKind {
    Interactions,
    Goals,
}

impl StoreKind {
    fn empty_contents(self) -> Result<Vec<u8>, StorageError> {
        match self {
            StoreKind::Interactions => encode_interactions(&[]),
            StoreKind::Goals => encode_goals(&[]),
        }
    }
}

#[derive(Clone)]
pub struct CsvRepository {
    interactions_path: PathBuf,
    goals_path: PathBuf,
    interactions_lock: Arc<Mutex<()>>,
    goals_lock: Arc<Mutex<()>>,
}

impl CsvRepository {
    /// Open the stores in `data_dir`, creating the directory and any missing
    /// file with its header. Existing files are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `FlatFileInitError` if the directory or files cannot be created.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, FlatFileInitError> {
        let dir = data_dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| FlatFileInitError::DataDir {
                path: dir.to_path_buf(),
                source,
            })?;

        let repo = Self {
            interactions_path: dir.join(INTERACTIONS_FILE),
            goals_path: dir.join(GOALS_FILE),
            interactions_lock: Arc::new(Mutex::new(())),
            goals_lock: Arc::new(Mutex::new(())),
        };
        repo.initialize().await?;
        info!(data_dir = %dir.display(), "flat-file stores ready");
        Ok(repo)
    }

    /// Create header-only files for any store that does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if a file cannot be created.
    pub async fn initialize(&self) -> Result<(), StorageError> {
        ensure_file(&self.interactions_path, StoreKind::Interactions).await?;
        ensure_file(&self.goals_path, StoreKind::Goals).await?;
        Ok(())
    }

    #[must_use]
    pub fn interactions_path(&self) -> &Path {
        &self.interactions_path
    }

    #[must_use]
    pub fn goals_path(&self) -> &Path {
        &self.goals_path
    }

    pub(crate) fn interactions_lock(&self) -> &Mutex<()> {
        &self.interactions_lock
    }

    pub(crate) fn goals_lock(&self) -> &Mutex<()> {
        &self.goals_lock
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

async fn ensure_file(path: &Path, kind: StoreKind) -> Result<bool, StorageError> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|err| io_error(path, &err))?;
    if exists {
        return Ok(false);
    }
    write_atomic(path, &kind.empty_contents()?).await?;
    info!(path = %path.display(), "initialized empty store");
    Ok(true)
}

/// Read a store file, recreating it header-only if it has gone missing.
pub(crate) async fn read_store(path: &Path, kind: StoreKind) -> Result<Vec<u8>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "read store");
            Ok(bytes)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "store missing on read; recreating");
            let contents = kind.empty_contents()?;
            write_atomic(path, &contents).await?;
            Ok(contents)
        }
        Err(err) => Err(io_error(path, &err)),
    }
}

/// Replace `path` with `contents` via a temporary sibling file.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|err| io_error(&tmp, &err))?;
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_error(path, &err));
    }
    debug!(path = %path.display(), bytes = contents.len(), "wrote store");
    Ok(())
}

impl Storage {
    /// Build a `Storage` backed by CSV files in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `FlatFileInitError` if the stores cannot be initialized.
    pub async fn flat_file(data_dir: impl AsRef<Path>) -> Result<Self, FlatFileInitError> {
        let repo = CsvRepository::open(data_dir).await?;
        let interactions: Arc<dyn InteractionRepository> = Arc::new(repo.clone());
        let goals: Arc<dyn GoalRepository> = Arc::new(repo);
        Ok(Self {
            interactions,
            goals,
        })
    }
}

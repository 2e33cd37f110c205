//! Shared error types for the services crate.
//!
//! Only storage failures, labels outside the configuration and malformed
//! attachments surface here. Missing goals,
//! zero goals and past deadlines resolve to defaults inside the services.

use std::path::PathBuf;

use thiserror::Error;

use situm_core::model::LabelError;
use storage::flat_file::FlatFileInitError;
use storage::repository::StorageError;

/// Errors emitted by `GoalService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GoalServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Goals(#[from] GoalServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `InteractionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InteractionServiceError {
    #[error("not offered by this deployment: {0}")]
    NotOffered(#[from] LabelError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RubricService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RubricServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AttachmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttachmentError {
    #[error("cannot read attachment {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed contact list: {0}")]
    Malformed(#[from] csv::Error),
    #[error("attachment is not valid UTF-8 text")]
    NotText,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    FlatFile(#[from] FlatFileInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

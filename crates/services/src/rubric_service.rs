use std::sync::Arc;

use tracing::info;

use situm_core::model::{Interaction, Operator};
use situm_core::rubric::{self, RubricFilter, RubricOptions};
use storage::flat_file::encode_interactions;
use storage::repository::InteractionRepository;

use crate::CrmConfig;
use crate::error::RubricServiceError;

/// A filtered rubric serialized with the interaction log's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricExport {
    pub file_name: String,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// Filtered contact views and CSV export.
#[derive(Clone)]
pub struct RubricService {
    config: Arc<CrmConfig>,
    interactions: Arc<dyn InteractionRepository>,
}

impl RubricService {
    #[must_use]
    pub fn new(config: Arc<CrmConfig>, interactions: Arc<dyn InteractionRepository>) -> Self {
        Self {
            config,
            interactions,
        }
    }

    /// Filter choices present in the rows `viewer` can see.
    ///
    /// # Errors
    ///
    /// Returns `RubricServiceError::Storage` if the log cannot be read.
    pub async fn options(&self, viewer: Operator) -> Result<RubricOptions, RubricServiceError> {
        let log = self.interactions.load_interactions().await?;
        Ok(RubricOptions::from_log(&log, viewer, &self.config))
    }

    /// Rows visible to `viewer` that pass `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RubricServiceError::Storage` if the log cannot be read.
    pub async fn filter(
        &self,
        viewer: Operator,
        filter: &RubricFilter,
    ) -> Result<Vec<Interaction>, RubricServiceError> {
        let log = self.interactions.load_interactions().await?;
        Ok(rubric::filter_log(&log, viewer, filter, &self.config))
    }

    /// Serialize the filtered rows as CSV.
    ///
    /// # Errors
    ///
    /// Returns `RubricServiceError::Storage` if the log cannot be read or encoded.
    pub async fn export(
        &self,
        viewer: Operator,
        filter: &RubricFilter,
    ) -> Result<RubricExport, RubricServiceError> {
        let rows = self.filter(viewer, filter).await?;
        let bytes = encode_interactions(&rows)?;
        info!(viewer = %viewer, rows = rows.len(), "rubric exported");
        Ok(RubricExport {
            file_name: rubric::export_file_name(viewer),
            rows: rows.len(),
            bytes,
        })
    }
}

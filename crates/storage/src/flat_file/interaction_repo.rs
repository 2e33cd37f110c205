use async_trait::async_trait;
use chrono::NaiveDate;
use situm_core::model::{Interaction, InteractionDraft, InteractionId, Operator};
use tracing::info;

use crate::repository::{InteractionRepository, StorageError, locate_selected};

use super::{CsvRepository, StoreKind, mapping, read_store, write_atomic};

impl CsvRepository {
    async fn read_interactions(&self) -> Result<Vec<Interaction>, StorageError> {
        let bytes = read_store(&self.interactions_path, StoreKind::Interactions).await?;
        mapping::decode_interactions(&bytes)
    }

    async fn write_interactions(&self, rows: &[Interaction]) -> Result<(), StorageError> {
        let bytes = mapping::encode_interactions(rows)?;
        write_atomic(&self.interactions_path, &bytes).await
    }
}

#[async_trait]
impl InteractionRepository for CsvRepository {
    async fn load_interactions(&self) -> Result<Vec<Interaction>, StorageError> {
        self.read_interactions().await
    }

    async fn save_interactions(&self, rows: &[Interaction]) -> Result<(), StorageError> {
        let _guard = self.interactions_lock().lock().await;
        self.write_interactions(rows).await
    }

    async fn append_interaction(
        &self,
        draft: InteractionDraft,
        date: NaiveDate,
    ) -> Result<Interaction, StorageError> {
        let _guard = self.interactions_lock().lock().await;
        let mut rows = self.read_interactions().await?;
        // ids are row positions in this backend
        let id = InteractionId::new(rows.len() as u64 + 1);
        let interaction = draft.into_interaction(id, date);
        rows.push(interaction.clone());
        self.write_interactions(&rows).await?;
        info!(
            id = %interaction.id,
            operator = %interaction.operator,
            event = %interaction.event,
            "interaction appended"
        );
        Ok(interaction)
    }

    async fn delete_interaction(
        &self,
        operator: Operator,
        selected: &Interaction,
    ) -> Result<Option<Interaction>, StorageError> {
        let _guard = self.interactions_lock().lock().await;
        let mut rows = self.read_interactions().await?;
        let Some(idx) = locate_selected(&rows, operator, selected) else {
            return Ok(None);
        };
        let removed = rows.remove(idx);
        self.write_interactions(&rows).await?;
        info!(id = %removed.id, operator = %operator, "interaction deleted");
        Ok(Some(removed))
    }
}

use async_trait::async_trait;
use situm_core::model::{EventName, Goal, Operator, upsert_goals};
use tracing::info;

use crate::repository::{GoalRepository, StorageError};

use super::{CsvRepository, StoreKind, mapping, read_store, write_atomic};

impl CsvRepository {
    async fn read_goals(&self) -> Result<Vec<Goal>, StorageError> {
        let bytes = read_store(&self.goals_path, StoreKind::Goals).await?;
        mapping::decode_goals(&bytes)
    }

    async fn write_goals(&self, goals: &[Goal]) -> Result<(), StorageError> {
        let bytes = mapping::encode_goals(goals)?;
        write_atomic(&self.goals_path, &bytes).await
    }
}

#[async_trait]
impl GoalRepository for CsvRepository {
    async fn load_goals(&self) -> Result<Vec<Goal>, StorageError> {
        self.read_goals().await
    }

    async fn save_goals(&self, goals: &[Goal]) -> Result<(), StorageError> {
        let _guard = self.goals_lock().lock().await;
        self.write_goals(goals).await
    }

    async fn replace_goals(
        &self,
        operator: Operator,
        event: &EventName,
        goals: Vec<Goal>,
    ) -> Result<(), StorageError> {
        let _guard = self.goals_lock().lock().await;
        let existing = self.read_goals().await?;
        let count = goals.len();
        let updated = upsert_goals(existing, operator, event, goals);
        self.write_goals(&updated).await?;
        info!(operator = %operator, event = %event, rows = count, "goals replaced");
        Ok(())
    }
}

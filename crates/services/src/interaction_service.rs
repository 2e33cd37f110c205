use std::sync::Arc;

use tracing::{info, warn};

use situm_core::deletion::{self, DeletionCandidate, DeletionKey};
use situm_core::model::{Interaction, InteractionDraft, Operator};
use storage::repository::InteractionRepository;

use crate::{Clock, CrmConfig};
use crate::error::InteractionServiceError;

/// Records and removes interactions.
#[derive(Clone)]
pub struct InteractionService {
    clock: Clock,
    config: Arc<CrmConfig>,
    interactions: Arc<dyn InteractionRepository>,
}

impl InteractionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: Arc<CrmConfig>,
        interactions: Arc<dyn InteractionRepository>,
    ) -> Self {
        Self {
            clock,
            config,
            interactions,
        }
    }

    /// Append a submitted interaction dated today. Persisted before returning.
    ///
    /// # Errors
    ///
    /// Returns `InteractionServiceError::NotOffered` if a label is outside the
    /// configuration, or `InteractionServiceError::Storage` if the write did
    /// not persist.
    pub async fn record(
        &self,
        draft: InteractionDraft,
    ) -> Result<Interaction, InteractionServiceError> {
        self.config.admits(&draft)?;
        let interaction = self
            .interactions
            .append_interaction(draft, self.clock.today())
            .await?;
        Ok(interaction)
    }

    /// The operator's own rows, newest first, labelled for a picker.
    ///
    /// # Errors
    ///
    /// Returns `InteractionServiceError::Storage` if the log cannot be read.
    pub async fn deletion_candidates(
        &self,
        operator: Operator,
    ) -> Result<Vec<DeletionCandidate>, InteractionServiceError> {
        let log = self.interactions.load_interactions().await?;
        Ok(deletion::candidates(&log, operator))
    }

    /// Delete the operator's row selected by `key`.
    ///
    /// Returns the removed row. A key that is unknown, owned by someone else,
    /// or no longer matching the row's content is a no-op and returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `InteractionServiceError::Storage` if the log cannot be read or
    /// rewritten.
    pub async fn delete(
        &self,
        operator: Operator,
        key: &DeletionKey,
    ) -> Result<Option<Interaction>, InteractionServiceError> {
        let log = self.interactions.load_interactions().await?;
        let Some(idx) = deletion::position_of(&log, operator, key) else {
            warn!(operator = %operator, key = %key, "no deletable interaction with this key");
            return Ok(None);
        };
        let removed = self
            .interactions
            .delete_interaction(operator, &log[idx])
            .await?;
        if removed.is_some() {
            info!(operator = %operator, key = %key, "interaction removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use situm_core::model::{
        EventName, InteractionId, InteractionStatus, Region, Source, TargetType,
    };
    use situm_core::time::{fixed_clock, fixed_today};
    use storage::repository::InMemoryRepository;

    fn draft(operator: Operator, name: &str) -> InteractionDraft {
        InteractionDraft::new(
            operator,
            name,
            TargetType::Student,
            "ITIS Fermi",
            Region::Abruzzo,
            EventName::new("SITUM-PLAY").unwrap(),
            InteractionStatus::Contacted,
            Source::Instagram,
        )
    }

    fn service() -> InteractionService {
        InteractionService::new(
            fixed_clock(),
            Arc::new(CrmConfig::situm()),
            Arc::new(InMemoryRepository::new()),
        )
    }

    #[tokio::test]
    async fn record_stamps_today() {
        let service = service();
        let row = service.record(draft(Operator::Bianca, "Elena")).await.unwrap();
        assert_eq!(row.date, fixed_today());
        assert_eq!(row.operator, Operator::Bianca);
    }

    #[tokio::test]
    async fn record_rejects_labels_outside_the_configuration() {
        let mut config = CrmConfig::situm();
        config.sources.retain(|source| *source != Source::Instagram);
        let repo = Arc::new(InMemoryRepository::new());
        let service = InteractionService::new(fixed_clock(), Arc::new(config), repo.clone());

        let err = service.record(draft(Operator::Bianca, "Elena")).await.unwrap_err();
        assert!(matches!(err, InteractionServiceError::NotOffered(_)));
        assert!(repo.load_interactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_shrinks_log_by_one() {
        let service = service();
        service.record(draft(Operator::Bianca, "Elena")).await.unwrap();
        let target = service.record(draft(Operator::Bianca, "Franco")).await.unwrap();
        service.record(draft(Operator::Nicole, "Gino")).await.unwrap();

        let key = DeletionKey::of(&target);
        let removed = service.delete(Operator::Bianca, &key).await.unwrap();
        assert_eq!(removed, Some(target));

        let remaining = service.interactions.load_interactions().await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|r| r.name != "Franco"));
    }

    #[tokio::test]
    async fn delete_with_nothing_to_delete_is_a_noop() {
        let service = service();
        let ghost = draft(Operator::Nadia, "Ivo")
            .into_interaction(InteractionId::new(1), fixed_today());
        let removed = service.delete(Operator::Nadia, &DeletionKey::of(&ghost)).await.unwrap();
        assert_eq!(removed, None);

        let other = service.record(draft(Operator::Nicole, "Gino")).await.unwrap();
        let removed = service.delete(Operator::Nadia, &DeletionKey::of(&other)).await.unwrap();
        assert_eq!(removed, None);
        assert_eq!(service.interactions.load_interactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn candidates_are_scoped_to_operator() {
        let service = service();
        service.record(draft(Operator::Bianca, "Elena")).await.unwrap();
        service.record(draft(Operator::Nicole, "Gino")).await.unwrap();

        let list = service.deletion_candidates(Operator::Nicole).await.unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].label.contains("Gino (Studente, SITUM-PLAY)"));
    }
}

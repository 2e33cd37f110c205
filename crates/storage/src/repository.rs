use async_trait::async_trait;
use chrono::NaiveDate;
use situm_core::model::{
    EventName, Goal, Interaction, InteractionDraft, InteractionId, Operator, upsert_goals,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// Lookups with no match are not errors at this layer; only I/O and decoding
/// failures are reported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("i/o error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the interaction log.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Read the full log in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read or decoded.
    async fn load_interactions(&self) -> Result<Vec<Interaction>, StorageError>;

    /// Replace the full log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be written. Nothing is
    /// considered persisted in that case.
    async fn save_interactions(&self, rows: &[Interaction]) -> Result<(), StorageError>;

    /// Append one interaction recorded on `date` and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read or written.
    async fn append_interaction(
        &self,
        draft: InteractionDraft,
        date: NaiveDate,
    ) -> Result<Interaction, StorageError>;

    /// Remove the operator's row matching `selected`.
    ///
    /// The row is located by id and confirmed by content; if the id no longer
    /// points at that content, the first row with identical content is used.
    /// Returns the removed row, or `None` when nothing matched (log unchanged).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read or written.
    async fn delete_interaction(
        &self,
        operator: Operator,
        selected: &Interaction,
    ) -> Result<Option<Interaction>, StorageError>;
}

/// Repository contract for the goal set.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the goals cannot be read or decoded.
    async fn load_goals(&self) -> Result<Vec<Goal>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the goals cannot be written.
    async fn save_goals(&self, goals: &[Goal]) -> Result<(), StorageError>;

    /// Replace every goal row for (operator, event) with `goals`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the goals cannot be read or written.
    async fn replace_goals(
        &self,
        operator: Operator,
        event: &EventName,
        goals: Vec<Goal>,
    ) -> Result<(), StorageError>;
}

/// Locate the row to delete: same id and content first, then first content match.
#[must_use]
pub fn locate_selected(
    rows: &[Interaction],
    operator: Operator,
    selected: &Interaction,
) -> Option<usize> {
    if selected.operator != operator {
        return None;
    }
    rows.iter()
        .position(|row| row.id == selected.id && row.same_content(selected))
        .or_else(|| rows.iter().position(|row| row.same_content(selected)))
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Ids are assigned as `max + 1` and never renumbered.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    interactions: Arc<Mutex<Vec<Interaction>>>,
    goals: Arc<Mutex<Vec<Goal>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interactions: Arc::new(Mutex::new(Vec::new())),
            goals: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl InteractionRepository for InMemoryRepository {
    async fn load_interactions(&self) -> Result<Vec<Interaction>, StorageError> {
        let guard = self
            .interactions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_interactions(&self, rows: &[Interaction]) -> Result<(), StorageError> {
        let mut guard = self
            .interactions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = rows.to_vec();
        Ok(())
    }

    async fn append_interaction(
        &self,
        draft: InteractionDraft,
        date: NaiveDate,
    ) -> Result<Interaction, StorageError> {
        let mut guard = self
            .interactions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard
            .iter()
            .map(|row| row.id)
            .max()
            .map_or(InteractionId::new(1), InteractionId::next);
        let interaction = draft.into_interaction(id, date);
        guard.push(interaction.clone());
        Ok(interaction)
    }

    async fn delete_interaction(
        &self,
        operator: Operator,
        selected: &Interaction,
    ) -> Result<Option<Interaction>, StorageError> {
        let mut guard = self
            .interactions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(locate_selected(&guard, operator, selected).map(|idx| guard.remove(idx)))
    }
}

#[async_trait]
impl GoalRepository for InMemoryRepository {
    async fn load_goals(&self) -> Result<Vec<Goal>, StorageError> {
        let guard = self
            .goals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_goals(&self, goals: &[Goal]) -> Result<(), StorageError> {
        let mut guard = self
            .goals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = goals.to_vec();
        Ok(())
    }

    async fn replace_goals(
        &self,
        operator: Operator,
        event: &EventName,
        goals: Vec<Goal>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .goals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let existing = std::mem::take(&mut *guard);
        *guard = upsert_goals(existing, operator, event, goals);
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub interactions: Arc<dyn InteractionRepository>,
    pub goals: Arc<dyn GoalRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let interactions: Arc<dyn InteractionRepository> = Arc::new(repo.clone());
        let goals: Arc<dyn GoalRepository> = Arc::new(repo);
        Self {
            interactions,
            goals,
        }
    }
}

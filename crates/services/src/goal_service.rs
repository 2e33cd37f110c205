use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use situm_core::model::{
    EventName, Goal, Operator, TargetGoals, TargetType, deadline_for, goal_count_for,
};
use storage::repository::GoalRepository;

use crate::error::GoalServiceError;
use crate::{Clock, CrmConfig};

/// Stored goals of one (operator, event), with lookup defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalSheet {
    pub goals: TargetGoals,
    pub deadline: NaiveDate,
    /// False when no goal row exists and the values are defaults.
    pub is_set: bool,
}

/// Goal storage and lookup ("GoalSet").
///
/// Lookups never fail on missing data: an absent goal is 0 and an absent
/// deadline is today.
#[derive(Clone)]
pub struct GoalService {
    clock: Clock,
    config: Arc<CrmConfig>,
    goals: Arc<dyn GoalRepository>,
}

impl GoalService {
    #[must_use]
    pub fn new(clock: Clock, config: Arc<CrmConfig>, goals: Arc<dyn GoalRepository>) -> Self {
        Self {
            clock,
            config,
            goals,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(CrmConfig::situm()),
            Arc::new(storage::repository::InMemoryRepository::new()),
        )
    }

    /// Goal count for the triple, or 0 when none is set.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if the goal store cannot be read.
    pub async fn get_goal(
        &self,
        operator: Operator,
        target: TargetType,
        event: &EventName,
    ) -> Result<u32, GoalServiceError> {
        let goals = self.goals.load_goals().await?;
        Ok(goal_count_for(&goals, operator, target, event))
    }

    /// Deadline for (operator, event) regardless of target, or today when none is set.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if the goal store cannot be read.
    pub async fn get_deadline(
        &self,
        operator: Operator,
        event: &EventName,
    ) -> Result<NaiveDate, GoalServiceError> {
        let goals = self.goals.load_goals().await?;
        Ok(deadline_for(&goals, operator, event).unwrap_or_else(|| self.clock.today()))
    }

    /// All three target goals and the deadline from a single read of the store.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if the goal store cannot be read.
    pub async fn sheet(
        &self,
        operator: Operator,
        event: &EventName,
    ) -> Result<GoalSheet, GoalServiceError> {
        let goals = self.goals.load_goals().await?;
        let deadline = deadline_for(&goals, operator, event);
        let count = |target| goal_count_for(&goals, operator, target, event);
        Ok(GoalSheet {
            goals: TargetGoals::new(
                count(TargetType::Business),
                count(TargetType::Teacher),
                count(TargetType::Student),
            ),
            deadline: deadline.unwrap_or_else(|| self.clock.today()),
            is_set: deadline.is_some(),
        })
    }

    /// Replace the three target goals of (operator, event) with new values and deadline.
    ///
    /// Rows for any other (operator, event) pair are untouched.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if the goals cannot be persisted.
    pub async fn set_goals(
        &self,
        operator: Operator,
        event: &EventName,
        targets: TargetGoals,
        deadline: NaiveDate,
    ) -> Result<Vec<Goal>, GoalServiceError> {
        let rows = targets.into_goals(operator, event, deadline);
        self.goals
            .replace_goals(operator, event, rows.clone())
            .await?;
        info!(
            operator = %operator,
            event = %event,
            business = targets.business,
            teacher = targets.teacher,
            student = targets.student,
            %deadline,
            "goals updated"
        );
        Ok(rows)
    }

    /// Events offered to `operator`: the configured defaults, then any other
    /// event the operator has goals for, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if the goal store cannot be read.
    pub async fn known_events(
        &self,
        operator: Operator,
    ) -> Result<Vec<EventName>, GoalServiceError> {
        let goals = self.goals.load_goals().await?;
        let mut events = self.config.default_events.clone();
        for goal in goals.iter().filter(|goal| goal.operator == operator) {
            if !events.contains(&goal.event) {
                events.push(goal.event.clone());
            }
        }
        Ok(events)
    }
}

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use situm_core::model::{EventName, Operator, TargetType};
use situm_core::progress::{Progress, compute_progress, count_achieved};
use storage::repository::InteractionRepository;

use crate::error::ProgressServiceError;
use crate::goal_service::GoalService;
use crate::{Clock, CrmConfig};

/// Progress of a single target type within an event plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetProgress {
    pub target: TargetType,
    pub progress: Progress,
}

/// Goals, progress and suggested daily pace for one (operator, event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPlan {
    pub operator: Operator,
    pub event: EventName,
    pub deadline: NaiveDate,
    pub goals_set: bool,
    pub targets: Vec<TargetProgress>,
}

/// Derives achievement and daily outreach targets from the log ("ProgressEngine").
///
/// Recomputed from a fresh read on every call.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    config: Arc<CrmConfig>,
    interactions: Arc<dyn InteractionRepository>,
    goals: GoalService,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: Arc<CrmConfig>,
        interactions: Arc<dyn InteractionRepository>,
        goals: GoalService,
    ) -> Self {
        Self {
            clock,
            config,
            interactions,
            goals,
        }
    }

    /// Progress of (operator, event, target) against an explicit goal and deadline.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the log cannot be read.
    pub async fn compute_progress(
        &self,
        operator: Operator,
        event: &EventName,
        target: TargetType,
        goal: u32,
        deadline: NaiveDate,
    ) -> Result<Progress, ProgressServiceError> {
        let log = self.interactions.load_interactions().await?;
        let achieved = count_achieved(&log, operator, event, target, self.config.goal_status);
        Ok(compute_progress(achieved, goal, deadline, self.clock.today()))
    }

    /// Progress for every configured target type using the stored goals.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if either store cannot be read.
    pub async fn event_plan(
        &self,
        operator: Operator,
        event: &EventName,
    ) -> Result<EventPlan, ProgressServiceError> {
        let sheet = self.goals.sheet(operator, event).await?;
        let log = self.interactions.load_interactions().await?;
        let today = self.clock.today();

        let targets = self
            .config
            .target_types
            .iter()
            .map(|&target| {
                let goal_status = self.config.goal_status;
                let achieved = count_achieved(&log, operator, event, target, goal_status);
                let goal = sheet.goals.get(target);
                TargetProgress {
                    target,
                    progress: compute_progress(achieved, goal, sheet.deadline, today),
                }
            })
            .collect();

        debug!(operator = %operator, event = %event, "event plan computed");
        Ok(EventPlan {
            operator,
            event: event.clone(),
            deadline: sheet.deadline,
            goals_set: sheet.is_set,
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use situm_core::model::{InteractionDraft, InteractionStatus, Region, Source, TargetGoals};
    use situm_core::time::{fixed_clock, fixed_today};
    use storage::repository::Storage;

    fn service(storage: &Storage) -> ProgressService {
        let config = Arc::new(CrmConfig::situm());
        let goals =
            GoalService::new(fixed_clock(), Arc::clone(&config), Arc::clone(&storage.goals));
        ProgressService::new(fixed_clock(), config, Arc::clone(&storage.interactions), goals)
    }

    async fn log_paid(storage: &Storage, target: TargetType, count: usize) {
        for i in 0..count {
            let draft = InteractionDraft::new(
                Operator::Nicole,
                format!("Contact {i}"),
                target,
                "",
                Region::Marche,
                EventName::new("SITUM-FUTURE").unwrap(),
                InteractionStatus::Paid,
                Source::Email,
            );
            storage.interactions.append_interaction(draft, fixed_today()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn nicole_halfway_with_five_days_left() {
        let storage = Storage::in_memory();
        let progress = service(&storage);
        log_paid(&storage, TargetType::Business, 5).await;

        let event = EventName::new("SITUM-FUTURE").unwrap();
        let deadline = fixed_today() + Duration::days(5);
        let p = progress
            .compute_progress(Operator::Nicole, &event, TargetType::Business, 10, deadline)
            .await
            .unwrap();

        assert_eq!(p.achieved, 5);
        assert_eq!(p.percent, 50);
        assert_eq!(p.days_remaining, 5);
        assert_eq!(p.daily_target, 2);
    }

    #[tokio::test]
    async fn past_deadline_asks_for_the_whole_gap_today() {
        let storage = Storage::in_memory();
        let progress = service(&storage);
        log_paid(&storage, TargetType::Business, 5).await;

        let event = EventName::new("SITUM-FUTURE").unwrap();
        let deadline = fixed_today() - Duration::days(1);
        let p = progress
            .compute_progress(Operator::Nicole, &event, TargetType::Business, 10, deadline)
            .await
            .unwrap();

        assert_eq!(p.days_remaining, 1);
        assert_eq!(p.daily_target, 10);
    }

    #[tokio::test]
    async fn event_plan_without_goals_reports_zeroes() {
        let storage = Storage::in_memory();
        let progress = service(&storage);
        log_paid(&storage, TargetType::Student, 2).await;

        let plan = progress
            .event_plan(Operator::Nicole, &EventName::new("SITUM-FUTURE").unwrap())
            .await
            .unwrap();

        assert!(!plan.goals_set);
        assert_eq!(plan.deadline, fixed_today());
        assert_eq!(plan.targets.len(), 3);
        for t in &plan.targets {
            assert_eq!(t.progress.percent, 0);
            assert_eq!(t.progress.daily_target, 0);
        }
        assert_eq!(plan.targets[2].progress.achieved, 2);
    }

    #[tokio::test]
    async fn event_plan_uses_stored_goals() {
        let storage = Storage::in_memory();
        let progress = service(&storage);
        let event = EventName::new("SITUM-FUTURE").unwrap();
        progress
            .goals
            .set_goals(
                Operator::Nicole,
                &event,
                TargetGoals::new(10, 4, 0),
                fixed_today() + Duration::days(5),
            )
            .await
            .unwrap();
        log_paid(&storage, TargetType::Business, 5).await;

        let plan = progress.event_plan(Operator::Nicole, &event).await.unwrap();

        assert!(plan.goals_set);
        let business = plan.targets[0].progress;
        assert_eq!((business.percent, business.daily_target), (50, 2));
        let teacher = plan.targets[1].progress;
        assert_eq!((teacher.percent, teacher.daily_target), (0, 2));
    }
}

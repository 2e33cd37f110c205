use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{EventName, Operator, TargetType};

/// Composite key of a goal row. At most one goal exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoalKey {
    pub operator: Operator,
    pub event: EventName,
    pub target: TargetType,
}

/// Numeric recruitment goal with its deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub operator: Operator,
    pub target: TargetType,
    pub event: EventName,
    pub goal_count: u32,
    pub deadline: NaiveDate,
}

impl Goal {
    #[must_use]
    pub fn new(
        operator: Operator,
        target: TargetType,
        event: EventName,
        goal_count: u32,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            operator,
            target,
            event,
            goal_count,
            deadline,
        }
    }

    #[must_use]
    pub fn key(&self) -> GoalKey {
        GoalKey {
            operator: self.operator,
            event: self.event.clone(),
            target: self.target,
        }
    }

    #[must_use]
    pub fn belongs_to(&self, operator: Operator, event: &EventName) -> bool {
        self.operator == operator && &self.event == event
    }
}

/// Per-target goal counts submitted together for one (operator, event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetGoals {
    pub business: u32,
    pub teacher: u32,
    pub student: u32,
}

impl TargetGoals {
    #[must_use]
    pub fn new(business: u32, teacher: u32, student: u32) -> Self {
        Self {
            business,
            teacher,
            student,
        }
    }

    #[must_use]
    pub fn get(&self, target: TargetType) -> u32 {
        match target {
            TargetType::Business => self.business,
            TargetType::Teacher => self.teacher,
            TargetType::Student => self.student,
        }
    }

    /// Expand into one goal row per target type, all sharing the deadline.
    #[must_use]
    pub fn into_goals(
        self,
        operator: Operator,
        event: &EventName,
        deadline: NaiveDate,
    ) -> Vec<Goal> {
        TargetType::ALL
            .iter()
            .map(|&target| {
                Goal::new(operator, target, event.clone(), self.get(target), deadline)
            })
            .collect()
    }
}

/// Replace every row for (operator, event) with `replacement`, keeping other
/// rows in order. When `replacement` repeats a key, its last row wins.
#[must_use]
pub fn upsert_goals(
    existing: Vec<Goal>,
    operator: Operator,
    event: &EventName,
    replacement: Vec<Goal>,
) -> Vec<Goal> {
    let mut kept: Vec<Goal> = existing
        .into_iter()
        .filter(|goal| !goal.belongs_to(operator, event))
        .collect();

    let mut seen = HashSet::new();
    let mut fresh: Vec<Goal> = replacement
        .into_iter()
        .rev()
        .filter(|goal| seen.insert(goal.key()))
        .collect();
    fresh.reverse();

    kept.extend(fresh);
    kept
}

/// Goal count for the triple, or 0 when no row matches.
#[must_use]
pub fn goal_count_for(
    goals: &[Goal],
    operator: Operator,
    target: TargetType,
    event: &EventName,
) -> u32 {
    goals
        .iter()
        .find(|goal| goal.target == target && goal.belongs_to(operator, event))
        .map_or(0, |goal| goal.goal_count)
}

/// Deadline of the first row for (operator, event), whatever its target.
#[must_use]
pub fn deadline_for(goals: &[Goal], operator: Operator, event: &EventName) -> Option<NaiveDate> {
    goals
        .iter()
        .find(|goal| goal.belongs_to(operator, event))
        .map(|goal| goal.deadline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> EventName {
        EventName::new(name).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn into_goals_covers_every_target() {
        let goals =
            TargetGoals::new(10, 4, 30).into_goals(Operator::Nadia, &event("SITUM-PLAY"), day(1));
        assert_eq!(goals.len(), 3);
        assert_eq!(goals[0].target, TargetType::Business);
        assert_eq!(goals[2].goal_count, 30);
    }

    #[test]
    fn lookups_default_when_absent() {
        let future = event("SITUM-FUTURE");
        let play = event("SITUM-PLAY");
        let goals = TargetGoals::new(10, 0, 3).into_goals(Operator::Nicole, &future, day(5));

        let count = |op, target, ev: &EventName| goal_count_for(&goals, op, target, ev);
        assert_eq!(count(Operator::Nicole, TargetType::Business, &future), 10);
        assert_eq!(count(Operator::Nicole, TargetType::Business, &play), 0);
        assert_eq!(goal_count_for(&[], Operator::Nadia, TargetType::Student, &play), 0);
        assert_eq!(deadline_for(&goals, Operator::Nicole, &future), Some(day(5)));
        assert_eq!(deadline_for(&goals, Operator::Alberto, &future), None);
    }

    #[test]
    fn upsert_replaces_only_matching_pair() {
        let play = event("SITUM-PLAY");
        let other = Goal::new(Operator::Bianca, TargetType::Business, play.clone(), 3, day(2));
        let stale = Goal::new(Operator::Nadia, TargetType::Teacher, play.clone(), 1, day(2));
        let fresh = TargetGoals::new(5, 6, 7).into_goals(Operator::Nadia, &play, day(9));

        let updated = upsert_goals(vec![other.clone(), stale], Operator::Nadia, &play, fresh);

        assert_eq!(updated.len(), 4);
        assert_eq!(updated[0], other);
        assert!(updated[1..].iter().all(|g| g.deadline == day(9)));
    }

    #[test]
    fn upsert_keeps_one_row_per_key() {
        let play = event("SITUM-PLAY");
        let mut fresh = TargetGoals::new(5, 6, 7).into_goals(Operator::Nadia, &play, day(9));
        fresh.push(Goal::new(Operator::Nadia, TargetType::Business, play.clone(), 12, day(9)));

        let updated = upsert_goals(Vec::new(), Operator::Nadia, &play, fresh);

        assert_eq!(updated.len(), 3);
        let keys: HashSet<GoalKey> = updated.iter().map(Goal::key).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(goal_count_for(&updated, Operator::Nadia, TargetType::Business, &play), 12);
    }
}

//! Goal progress and daily outreach projection.
//!
//! Everything here is pure and total: absent goals, zero goals and past
//! deadlines all produce a defined result instead of an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{EventName, Interaction, InteractionStatus, Operator, TargetType};

/// Multiplier applied to the linear pace when projecting contacts per day.
pub const DAILY_URGENCY_FACTOR: u64 = 2;

/// Derived progress metrics for one (operator, event, target) goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub goal: u32,
    pub achieved: u32,
    /// `round(achieved / goal * 100)`, not clamped above 100. Zero when no goal is set.
    pub percent: u32,
    /// Days until the deadline, never below 1.
    pub days_remaining: i64,
    /// Contacts per day needed to close the gap at the urgency pace.
    pub daily_target: u32,
}

impl Progress {
    #[must_use]
    pub fn has_goal(&self) -> bool {
        self.goal > 0
    }

    #[must_use]
    pub fn is_reached(&self) -> bool {
        self.has_goal() && self.achieved >= self.goal
    }
}

/// Count rows for (operator, event, target) that reached `goal_status`.
///
/// Earlier funnel stages are not counted.
#[must_use]
pub fn count_achieved(
    log: &[Interaction],
    operator: Operator,
    event: &EventName,
    target: TargetType,
    goal_status: InteractionStatus,
) -> u32 {
    let count = log
        .iter()
        .filter(|row| {
            row.operator == operator
                && row.target == target
                && row.status == goal_status
                && &row.event == event
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Days left until `deadline`, clamped to at least 1.
///
/// A passed deadline compresses all remaining work into a single day.
#[must_use]
pub fn days_remaining(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days().max(1)
}

/// Compute percent complete and the projected daily target.
#[must_use]
pub fn compute_progress(
    achieved: u32,
    goal: u32,
    deadline: NaiveDate,
    today: NaiveDate,
) -> Progress {
    let days = days_remaining(deadline, today);

    let percent = if goal > 0 {
        saturate(div_round_half_even(u64::from(achieved) * 100, u64::from(goal)))
    } else {
        0
    };

    let daily_target = if achieved < goal {
        let gap = u64::from(goal - achieved) * DAILY_URGENCY_FACTOR;
        // days >= 1 by construction
        saturate(div_round_half_even(gap, days.unsigned_abs()))
    } else {
        0
    };

    Progress {
        goal,
        achieved,
        percent,
        days_remaining: days,
        daily_target,
    }
}

/// Integer division rounding to the nearest value, ties to even.
fn div_round_half_even(num: u64, den: u64) -> u64 {
    let quotient = num / den;
    let twice_rem = (num % den) * 2;
    if twice_rem > den || (twice_rem == den && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

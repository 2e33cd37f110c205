mod event;
mod goal;
mod ids;
mod interaction;
mod labels;
mod selection;

pub use event::{EventError, EventName};
pub use goal::{Goal, GoalKey, TargetGoals, deadline_for, goal_count_for, upsert_goals};
pub use ids::{InteractionId, ParseIdError};
pub use interaction::{Interaction, InteractionDraft, non_blank};
pub use labels::{InteractionStatus, LabelError, Operator, Region, Source, TargetType};
pub use selection::Selection;

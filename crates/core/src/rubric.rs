//! Filtered contact views ("rubrica").
//!
//! Row visibility by operator is a filtering convention. It is not an access
//! control boundary: operator identity is self-selected.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::CrmConfig;
use crate::model::{EventName, Interaction, InteractionStatus, Operator, Selection, TargetType};

/// Independent filter dimensions; `Selection::All` bypasses a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RubricFilter {
    pub event: Selection<EventName>,
    pub target: Selection<TargetType>,
    pub status: Selection<InteractionStatus>,
}

impl RubricFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn matches(&self, row: &Interaction) -> bool {
        self.event.matches(&row.event)
            && self.target.matches(&row.target)
            && self.status.matches(&row.status)
    }
}

/// Rows `viewer` is allowed to see: all for the coordinator, own rows otherwise.
pub fn visible_to<'a>(
    log: &'a [Interaction],
    viewer: Operator,
    config: &'a CrmConfig,
) -> impl Iterator<Item = &'a Interaction> + 'a {
    let everything = config.sees_everything(viewer);
    log.iter()
        .filter(move |row| everything || row.operator == viewer)
}

/// Apply the viewer scope and filters, newest first.
///
/// Rows sharing a date keep their log order.
#[must_use]
pub fn filter_log(
    log: &[Interaction],
    viewer: Operator,
    filter: &RubricFilter,
    config: &CrmConfig,
) -> Vec<Interaction> {
    let mut rows: Vec<Interaction> = visible_to(log, viewer, config)
        .filter(|row| filter.matches(row))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

/// Values present in the viewer's rows, used to populate filter choices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RubricOptions {
    pub events: Vec<EventName>,
    pub targets: Vec<TargetType>,
    pub statuses: Vec<InteractionStatus>,
}

impl RubricOptions {
    #[must_use]
    pub fn from_log(log: &[Interaction], viewer: Operator, config: &CrmConfig) -> Self {
        let mut events = BTreeSet::new();
        let mut statuses = BTreeSet::new();
        for row in visible_to(log, viewer, config) {
            events.insert(row.event.clone());
            statuses.insert(row.status);
        }
        Self {
            events: events.into_iter().collect(),
            targets: config.target_types.clone(),
            statuses: statuses.into_iter().collect(),
        }
    }
}

/// Download name for an exported rubric.
#[must_use]
pub fn export_file_name(viewer: Operator) -> String {
    format!("rubrica_{}.csv", viewer.as_str())
}

use crate::model::{
    EventName, InteractionDraft, InteractionStatus, LabelError, Operator, Region, Source,
    TargetType,
};

/// Domain parameters of a dashboard deployment.
///
/// One core serves every variant of the outreach dashboard; variants differ
/// only in which labels they offer and which status closes a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmConfig {
    pub operators: Vec<Operator>,
    pub target_types: Vec<TargetType>,
    pub statuses: Vec<InteractionStatus>,
    pub regions: Vec<Region>,
    pub sources: Vec<Source>,
    /// Events offered before any operator-defined ones.
    pub default_events: Vec<EventName>,
    /// Status that counts toward goal achievement.
    pub goal_status: InteractionStatus,
    /// Role that sees every operator's rows.
    pub coordinator: Operator,
    /// Operators plotted on the coordinator's cumulative chart.
    pub chart_operators: Vec<Operator>,
    /// Statuses counted as participants on the cumulative chart.
    pub chart_statuses: Vec<InteractionStatus>,
}

impl CrmConfig {
    /// Configuration of the SITUM outreach program.
    #[must_use]
    pub fn situm() -> Self {
        let default_events = ["SITUM-FUTURE", "SITUM-PLAY", "SUMMER SCHOOL"]
            .into_iter()
            .filter_map(|name| EventName::new(name).ok())
            .collect();

        Self {
            operators: Operator::ALL.to_vec(),
            target_types: TargetType::ALL.to_vec(),
            statuses: InteractionStatus::ALL.to_vec(),
            regions: Region::ALL.to_vec(),
            sources: Source::ALL.to_vec(),
            default_events,
            goal_status: InteractionStatus::Paid,
            coordinator: Operator::Coordinator,
            chart_operators: vec![Operator::Nicole, Operator::Alberto, Operator::Vanessa],
            chart_statuses: vec![InteractionStatus::LetterSigned, InteractionStatus::Paid],
        }
    }

    /// Returns true when `operator` sees the full log.
    #[must_use]
    pub fn sees_everything(&self, operator: Operator) -> bool {
        operator == self.coordinator
    }

    /// Check that every label on `draft` is one this deployment offers.
    ///
    /// # Errors
    ///
    /// Returns `LabelError` naming the first field outside the configured lists.
    pub fn admits(&self, draft: &InteractionDraft) -> Result<(), LabelError> {
        fn offered<T: PartialEq + Copy>(
            kind: &'static str,
            list: &[T],
            value: T,
            label: fn(T) -> &'static str,
        ) -> Result<(), LabelError> {
            if list.contains(&value) {
                Ok(())
            } else {
                Err(LabelError::unknown(kind, label(value)))
            }
        }

        offered("operator", &self.operators, draft.operator, Operator::as_str)?;
        offered("target", &self.target_types, draft.target, TargetType::as_str)?;
        offered("region", &self.regions, draft.region, Region::as_str)?;
        offered("status", &self.statuses, draft.status, InteractionStatus::as_str)?;
        offered("source", &self.sources, draft.source, Source::as_str)
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self::situm()
    }
}

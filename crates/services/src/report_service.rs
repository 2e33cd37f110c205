use std::collections::BTreeSet;
use std::sync::Arc;

use situm_core::model::{EventName, Selection, TargetType};
use situm_core::report::{self, AggregateRow, CumulativeSeries, GroupBy};
use storage::repository::InteractionRepository;

use crate::CrmConfig;
use crate::error::ReportServiceError;

/// Coordinator aggregation over the full log.
#[derive(Clone)]
pub struct ReportService {
    config: Arc<CrmConfig>,
    interactions: Arc<dyn InteractionRepository>,
}

impl ReportService {
    #[must_use]
    pub fn new(config: Arc<CrmConfig>, interactions: Arc<dyn InteractionRepository>) -> Self {
        Self {
            config,
            interactions,
        }
    }

    /// Distinct events present in the log, sorted.
    ///
    /// # Errors
    ///
    /// Returns `ReportServiceError::Storage` if the log cannot be read.
    pub async fn events(&self) -> Result<Vec<EventName>, ReportServiceError> {
        let log = self.interactions.load_interactions().await?;
        let events: BTreeSet<EventName> = log.into_iter().map(|row| row.event).collect();
        Ok(events.into_iter().collect())
    }

    /// Interaction counts per bucket and target type.
    ///
    /// # Errors
    ///
    /// Returns `ReportServiceError::Storage` if the log cannot be read.
    pub async fn aggregate(
        &self,
        group_by: GroupBy,
        target: &Selection<TargetType>,
    ) -> Result<Vec<AggregateRow>, ReportServiceError> {
        let log = self.interactions.load_interactions().await?;
        Ok(report::aggregate(&log, group_by, target))
    }

    /// Cumulative participants per chart operator and target for `event`.
    ///
    /// # Errors
    ///
    /// Returns `ReportServiceError::Storage` if the log cannot be read.
    pub async fn cumulative(
        &self,
        event: &EventName,
    ) -> Result<Vec<CumulativeSeries>, ReportServiceError> {
        let log = self.interactions.load_interactions().await?;
        Ok(report::cumulative_series(&log, event, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use situm_core::model::{InteractionDraft, InteractionStatus, Operator, Region, Source};
    use storage::repository::Storage;

    #[tokio::test]
    async fn events_are_distinct_and_sorted() {
        let storage = Storage::in_memory();
        for event in ["SUMMER SCHOOL", "SITUM-PLAY", "SUMMER SCHOOL"] {
            let draft = InteractionDraft::new(
                Operator::Alberto,
                "Contact",
                TargetType::Teacher,
                "",
                Region::Marche,
                EventName::new(event).unwrap(),
                InteractionStatus::Paid,
                Source::Email,
            );
            storage
                .interactions
                .append_interaction(draft, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
                .await
                .unwrap();
        }
        let service =
            ReportService::new(Arc::new(CrmConfig::situm()), Arc::clone(&storage.interactions));

        let events = service.events().await.unwrap();
        let names: Vec<&str> = events.iter().map(EventName::as_str).collect();
        assert_eq!(names, vec!["SITUM-PLAY", "SUMMER SCHOOL"]);

        let rows = service.aggregate(GroupBy::Event, &Selection::All).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].count, 2);

        let series = service.cumulative(&events[1]).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points[0].cumulative, 2);
    }
}

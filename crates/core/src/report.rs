//! Coordinator-level aggregation for charts. Raw counts, no smoothing.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::CrmConfig;
use crate::model::{EventName, Interaction, LabelError, Operator, Selection, TargetType};

/// Dimension used to bucket interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    Region,
    Event,
    /// Calendar month of the interaction date, keyed `YYYY-MM`.
    Month,
}

impl GroupBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::Region => "region",
            GroupBy::Event => "event",
            GroupBy::Month => "month",
        }
    }

    fn key(self, row: &Interaction) -> String {
        match self {
            GroupBy::Region => row.region.as_str().to_owned(),
            GroupBy::Event => row.event.as_str().to_owned(),
            GroupBy::Month => row.date.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "region" => Ok(GroupBy::Region),
            "event" => Ok(GroupBy::Event),
            "month" => Ok(GroupBy::Month),
            other => Err(LabelError::unknown("group-by", other)),
        }
    }
}

/// Count of interactions for one bucket and target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: String,
    pub target: TargetType,
    pub count: usize,
}

/// Group rows by `group_by` and target type, optionally pinned to one target.
///
/// Output is ordered by bucket key, then target type.
#[must_use]
pub fn aggregate(
    log: &[Interaction],
    group_by: GroupBy,
    target: &Selection<TargetType>,
) -> Vec<AggregateRow> {
    let mut buckets: BTreeMap<(String, TargetType), usize> = BTreeMap::new();
    for row in log.iter().filter(|row| target.matches(&row.target)) {
        *buckets.entry((group_by.key(row), row.target)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|((key, target), count)| AggregateRow { key, target, count })
        .collect()
}

//
// ─── CUMULATIVE PARTICIPANTS ───────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub day: NaiveDate,
    pub daily: usize,
    pub cumulative: usize,
}

/// Running participant count for one (operator, target) line of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    pub operator: Operator,
    pub target: TargetType,
    pub points: Vec<CumulativePoint>,
}

/// Cumulative participants per day for `event`.
///
/// Counts rows of the chart operators whose status is one of the chart
/// statuses. Lines with no rows are omitted.
#[must_use]
pub fn cumulative_series(
    log: &[Interaction],
    event: &EventName,
    config: &CrmConfig,
) -> Vec<CumulativeSeries> {
    let mut series = Vec::new();
    for &operator in &config.chart_operators {
        for &target in &config.target_types {
            let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
            for row in log.iter().filter(|row| {
                row.operator == operator
                    && row.target == target
                    && &row.event == event
                    && config.chart_statuses.contains(&row.status)
            }) {
                *per_day.entry(row.date).or_default() += 1;
            }
            if per_day.is_empty() {
                continue;
            }

            let mut running = 0;
            let points = per_day
                .into_iter()
                .map(|(day, daily)| {
                    running += daily;
                    CumulativePoint {
                        day,
                        daily,
                        cumulative: running,
                    }
                })
                .collect();
            series.push(CumulativeSeries {
                operator,
                target,
                points,
            });
        }
    }
    series
}

//! Row shapes and codecs for the delimited flat files.
//!
//! Column names and order are fixed; files written by earlier versions of the
//! dashboard must keep loading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use situm_core::model::{EventName, Goal, Interaction, InteractionId, non_blank};

use crate::repository::StorageError;

pub const INTERACTION_HEADER: [&str; 12] = [
    "data",
    "nome",
    "target",
    "affiliazione",
    "regione",
    "evento",
    "stato_interazione",
    "fonte",
    "note",
    "telefono",
    "trascrizione",
    "angel",
];

pub const GOAL_HEADER: [&str; 5] = ["angel", "target", "evento", "obiettivo", "deadline"];

const DATE_FORMAT: &str = "%Y-%m-%d";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn at_line<E: core::fmt::Display>(line: u64) -> impl Fn(E) -> StorageError {
    move |e| StorageError::Serialization(format!("line {line}: {e}"))
}

/// Parse a stored date, tolerating a trailing time component.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, StorageError> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|_| StorageError::Serialization(format!("invalid date: {raw:?}")))
}

/// Parse a goal count, accepting integral floats such as `10.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn parse_count(raw: &str) -> Result<u32, StorageError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if let Ok(value) = trimmed.parse::<u32>() {
        return Ok(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value >= 0.0
                && value.fract() == 0.0
                && value <= f64::from(u32::MAX) =>
        {
            Ok(value as u32)
        }
        _ => Err(StorageError::Serialization(format!("invalid goal count: {raw:?}"))),
    }
}

//
// ─── INTERACTIONS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize, Deserialize)]
struct InteractionRow {
    #[serde(rename = "data")]
    date: String,
    #[serde(rename = "nome", default)]
    name: String,
    target: String,
    #[serde(rename = "affiliazione", default)]
    affiliation: String,
    #[serde(rename = "regione")]
    region: String,
    #[serde(rename = "evento")]
    event: String,
    #[serde(rename = "stato_interazione")]
    status: String,
    #[serde(rename = "fonte")]
    source: String,
    #[serde(default)]
    note: String,
    #[serde(rename = "telefono", default)]
    phone: String,
    #[serde(rename = "trascrizione", default)]
    transcript: String,
    #[serde(rename = "angel")]
    operator: String,
}

impl InteractionRow {
    fn from_interaction(row: &Interaction) -> Self {
        Self {
            date: row.date.format(DATE_FORMAT).to_string(),
            name: row.name.clone(),
            target: row.target.as_str().to_owned(),
            affiliation: row.affiliation.clone(),
            region: row.region.as_str().to_owned(),
            event: row.event.as_str().to_owned(),
            status: row.status.as_str().to_owned(),
            source: row.source.as_str().to_owned(),
            note: row.note.clone().unwrap_or_default(),
            phone: row.phone.clone().unwrap_or_default(),
            transcript: row.transcript.clone().unwrap_or_default(),
            operator: row.operator.as_str().to_owned(),
        }
    }

    fn into_interaction(self, id: InteractionId) -> Result<Interaction, StorageError> {
        Ok(Interaction {
            id,
            date: parse_date(&self.date)?,
            operator: self.operator.parse().map_err(ser)?,
            name: self.name,
            target: self.target.parse().map_err(ser)?,
            affiliation: self.affiliation,
            region: self.region.parse().map_err(ser)?,
            event: EventName::new(self.event).map_err(ser)?,
            status: self.status.parse().map_err(ser)?,
            source: self.source.parse().map_err(ser)?,
            note: non_blank(self.note),
            phone: non_blank(self.phone),
            transcript: non_blank(self.transcript),
        })
    }
}

/// Decode the interaction log. Ids follow row order, starting at 1.
///
/// # Errors
///
/// Returns `StorageError::Serialization` naming the offending line.
pub fn decode_interactions(bytes: &[u8]) -> Result<Vec<Interaction>, StorageError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<InteractionRow>().enumerate() {
        // header is line 1
        let line = idx as u64 + 2;
        let row = record.map_err(at_line(line))?;
        let id = InteractionId::new(idx as u64 + 1);
        rows.push(row.into_interaction(id).map_err(at_line(line))?);
    }
    Ok(rows)
}

/// Encode rows with the log's header. An empty slice yields the header alone.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if a row cannot be written.
pub fn encode_interactions(rows: &[Interaction]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(INTERACTION_HEADER).map_err(ser)?;
    for row in rows {
        writer.serialize(InteractionRow::from_interaction(row)).map_err(ser)?;
    }
    writer.into_inner().map_err(ser)
}

//
// ─── GOALS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize, Deserialize)]
struct GoalRow {
    #[serde(rename = "angel")]
    operator: String,
    target: String,
    #[serde(rename = "evento")]
    event: String,
    #[serde(rename = "obiettivo")]
    goal_count: String,
    deadline: String,
}

impl GoalRow {
    fn from_goal(goal: &Goal) -> Self {
        Self {
            operator: goal.operator.as_str().to_owned(),
            target: goal.target.as_str().to_owned(),
            event: goal.event.as_str().to_owned(),
            goal_count: goal.goal_count.to_string(),
            deadline: goal.deadline.format(DATE_FORMAT).to_string(),
        }
    }

    fn into_goal(self) -> Result<Goal, StorageError> {
        Ok(Goal {
            operator: self.operator.parse().map_err(ser)?,
            target: self.target.parse().map_err(ser)?,
            event: EventName::new(self.event).map_err(ser)?,
            goal_count: parse_count(&self.goal_count)?,
            deadline: parse_date(&self.deadline)?,
        })
    }
}

/// # Errors
///
/// Returns `StorageError::Serialization` naming the offending line.
pub fn decode_goals(bytes: &[u8]) -> Result<Vec<Goal>, StorageError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let mut goals = Vec::new();
    for (idx, record) in reader.deserialize::<GoalRow>().enumerate() {
        let line = idx as u64 + 2;
        let row = record.map_err(at_line(line))?;
        goals.push(row.into_goal().map_err(at_line(line))?);
    }
    Ok(goals)
}

/// # Errors
///
/// Returns `StorageError::Serialization` if a row cannot be written.
pub fn encode_goals(goals: &[Goal]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(GOAL_HEADER).map_err(ser)?;
    for goal in goals {
        writer.serialize(GoalRow::from_goal(goal)).map_err(ser)?;
    }
    writer.into_inner().map_err(ser)
}

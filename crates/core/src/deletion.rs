//! Removal of interactions from the log.
//!
//! Operators may only delete their own rows. The log is rewritten in full;
//! there is no in-place update or soft delete.
//!
//! A row is selected by [`DeletionKey`]: its id plus a digest of its content.
//! Ids follow row order in the flat-file store and shift when earlier rows go
//! away, so a key whose digest no longer matches the row at that id selects
//! nothing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::{Interaction, InteractionId, Operator};

/// Hex characters of the content digest kept in a key.
const DIGEST_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid deletion key {raw:?}: expected <id>:<digest>")]
pub struct ParseKeyError {
    raw: String,
}

/// Identifies one row as the operator saw it when listing candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DeletionKey {
    id: InteractionId,
    digest: String,
}

impl DeletionKey {
    #[must_use]
    pub fn of(row: &Interaction) -> Self {
        Self {
            id: row.id,
            digest: content_digest(row),
        }
    }

    #[must_use]
    pub fn id(&self) -> InteractionId {
        self.id
    }

    /// True when `row` carries this key's id and still has the same content.
    #[must_use]
    pub fn matches(&self, row: &Interaction) -> bool {
        row.id == self.id && content_digest(row) == self.digest
    }
}

impl fmt::Display for DeletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.digest)
    }
}

impl FromStr for DeletionKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseKeyError { raw: s.to_owned() };
        let (id, digest) = s.trim().split_once(':').ok_or_else(invalid)?;
        let id: InteractionId = id.trim_start_matches('#').parse().map_err(|_| invalid())?;
        let digest = digest.to_ascii_lowercase();
        if digest.len() != DIGEST_LEN || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        Ok(Self { id, digest })
    }
}

impl From<DeletionKey> for String {
    fn from(key: DeletionKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for DeletionKey {
    type Error = ParseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Short digest over every stored field of `row` except its id.
fn content_digest(row: &Interaction) -> String {
    let date = row.date.to_string();
    let fields: [&str; 12] = [
        date.as_str(),
        row.operator.as_str(),
        &row.name,
        row.target.as_str(),
        &row.affiliation,
        row.region.as_str(),
        row.event.as_str(),
        row.status.as_str(),
        row.source.as_str(),
        row.note.as_deref().unwrap_or(""),
        row.phone.as_deref().unwrap_or(""),
        row.transcript.as_deref().unwrap_or(""),
    ];
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher
        .finalize()
        .iter()
        .take(DIGEST_LEN / 2)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// A row offered for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionCandidate {
    pub key: DeletionKey,
    pub label: String,
}

/// The operator's own rows, newest first, with their display labels.
#[must_use]
pub fn candidates(log: &[Interaction], operator: Operator) -> Vec<DeletionCandidate> {
    let mut own: Vec<&Interaction> = log.iter().filter(|row| row.operator == operator).collect();
    own.sort_by(|a, b| b.date.cmp(&a.date));
    own.into_iter()
        .map(|row| DeletionCandidate {
            key: DeletionKey::of(row),
            label: row.label(),
        })
        .collect()
}

/// Position in `log` of the operator's row selected by `key`, if it is still
/// there unchanged.
#[must_use]
pub fn position_of(log: &[Interaction], operator: Operator, key: &DeletionKey) -> Option<usize> {
    log.iter()
        .position(|row| row.operator == operator && key.matches(row))
}

/// New log without the operator's row selected by `key`.
///
/// A key that is unknown, stale, or owned by another operator leaves the log
/// unchanged.
#[must_use]
pub fn delete_interaction(
    log: &[Interaction],
    operator: Operator,
    key: &DeletionKey,
) -> Vec<Interaction> {
    remove_at(log, position_of(log, operator, key))
}

/// New log without the first of the operator's rows rendering as `label`.
///
/// Labels are not unique. When two rows render the same label, the first one
/// in log order is removed. Prefer [`delete_interaction`], which selects by key.
#[must_use]
pub fn delete_by_label(log: &[Interaction], operator: Operator, label: &str) -> Vec<Interaction> {
    let position = log
        .iter()
        .position(|row| row.operator == operator && row.label() == label);
    remove_at(log, position)
}

fn remove_at(log: &[Interaction], position: Option<usize>) -> Vec<Interaction> {
    let mut next = log.to_vec();
    if let Some(idx) = position {
        next.remove(idx);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventName, InteractionDraft, InteractionStatus, Region, Source, TargetType};
    use chrono::NaiveDate;

    fn row(id: u64, operator: Operator, name: &str, day: u32) -> Interaction {
        InteractionDraft::new(
            operator,
            name,
            TargetType::Teacher,
            "IIS Volta",
            Region::Marche,
            EventName::new("SUMMER SCHOOL").unwrap(),
            InteractionStatus::LetterSigned,
            Source::Website,
        )
        .into_interaction(
            InteractionId::new(id),
            NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
        )
    }

    #[test]
    fn candidates_are_own_rows_newest_first() {
        let log = vec![
            row(1, Operator::Giorgio, "Anna", 1),
            row(2, Operator::Nicole, "Bruno", 4),
            row(3, Operator::Giorgio, "Carla", 9),
        ];
        let list = candidates(&log, Operator::Giorgio);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].key.id(), InteractionId::new(3));
        assert_eq!(list[0].label, "2025-02-09 - Carla (Docente, SUMMER SCHOOL)");
    }

    #[test]
    fn key_round_trips_through_text() {
        let key = DeletionKey::of(&row(7, Operator::Nadia, "Anna", 1));
        let text = key.to_string();
        assert!(text.starts_with("7:"));
        assert_eq!(text.len(), 2 + DIGEST_LEN);
        assert_eq!(text.parse::<DeletionKey>().unwrap(), key);
        assert_eq!(format!("#{text}").parse::<DeletionKey>().unwrap(), key);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for raw in ["7", "x:0011aabb", "7:0011", "7:zzzzzzzz", ""] {
            assert!(raw.parse::<DeletionKey>().is_err(), "{raw}");
        }
    }

    #[test]
    fn key_tracks_content_not_just_id() {
        let anna = row(2, Operator::Nicole, "Anna", 1);
        let bruno = row(2, Operator::Nicole, "Bruno", 1);
        let key = DeletionKey::of(&anna);
        assert!(key.matches(&anna));
        assert!(!key.matches(&bruno));
    }

    #[test]
    fn delete_removes_exactly_one_row() {
        let log = vec![
            row(1, Operator::Giorgio, "Anna", 1),
            row(2, Operator::Giorgio, "Bruno", 2),
        ];
        let next = delete_interaction(&log, Operator::Giorgio, &DeletionKey::of(&log[1]));
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, InteractionId::new(1));
    }

    #[test]
    fn stale_key_after_shift_is_a_noop() {
        let anna = row(2, Operator::Nicole, "Anna", 1);
        let key = DeletionKey::of(&anna);
        // the row before Anna is gone; Bruno now sits at id 2
        let shifted = vec![
            row(1, Operator::Nicole, "Anna", 1),
            row(2, Operator::Nicole, "Bruno", 1),
        ];
        assert_eq!(delete_interaction(&shifted, Operator::Nicole, &key), shifted);
    }

    #[test]
    fn delete_of_foreign_or_missing_row_is_a_noop() {
        let log = vec![row(1, Operator::Nicole, "Anna", 1)];
        let key = DeletionKey::of(&log[0]);
        assert_eq!(delete_interaction(&log, Operator::Giorgio, &key), log);
        let missing = DeletionKey::of(&row(99, Operator::Nicole, "Anna", 1));
        assert_eq!(delete_interaction(&log, Operator::Nicole, &missing), log);
        assert!(delete_interaction(&[], Operator::Nicole, &key).is_empty());
    }

    #[test]
    fn label_collision_resolves_to_first_match() {
        let log = vec![
            row(1, Operator::Nadia, "Anna", 1),
            row(2, Operator::Nadia, "Anna", 1),
        ];
        let label = log[1].label();
        let next = delete_by_label(&log, Operator::Nadia, &label);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, InteractionId::new(2));
    }
}

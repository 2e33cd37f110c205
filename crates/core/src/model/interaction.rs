use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{
    EventName, InteractionId, InteractionStatus, Operator, Region, Source, TargetType,
};

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Interaction as submitted by the data-entry form, before a date and id exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionDraft {
    pub operator: Operator,
    pub name: String,
    pub target: TargetType,
    pub affiliation: String,
    pub region: Region,
    pub event: EventName,
    pub status: InteractionStatus,
    pub source: Source,
    pub note: Option<String>,
    pub phone: Option<String>,
    pub transcript: Option<String>,
}

impl InteractionDraft {
    /// Draft with the required fields and no optional text.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operator: Operator,
        name: impl Into<String>,
        target: TargetType,
        affiliation: impl Into<String>,
        region: Region,
        event: EventName,
        status: InteractionStatus,
        source: Source,
    ) -> Self {
        Self {
            operator,
            name: name.into(),
            target,
            affiliation: affiliation.into(),
            region,
            event,
            status,
            source,
            note: None,
            phone: None,
            transcript: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = non_blank(note.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = non_blank(phone.into());
        self
    }

    #[must_use]
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = non_blank(transcript.into());
        self
    }

    /// Stamp the draft with its log position and the day it was recorded.
    #[must_use]
    pub fn into_interaction(self, id: InteractionId, date: NaiveDate) -> Interaction {
        Interaction {
            id,
            date,
            operator: self.operator,
            name: self.name,
            target: self.target,
            affiliation: self.affiliation,
            region: self.region,
            event: self.event,
            status: self.status,
            source: self.source,
            note: self.note.and_then(non_blank),
            phone: self.phone.and_then(non_blank),
            transcript: self.transcript.and_then(non_blank),
        }
    }
}

/// Blank optional text is stored as an empty cell and read back as `None`.
#[must_use]
pub fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

//
// ─── INTERACTION ───────────────────────────────────────────────────────────────
//

/// One recorded contact event. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub date: NaiveDate,
    pub operator: Operator,
    pub name: String,
    pub target: TargetType,
    pub affiliation: String,
    pub region: Region,
    pub event: EventName,
    pub status: InteractionStatus,
    pub source: Source,
    pub note: Option<String>,
    pub phone: Option<String>,
    pub transcript: Option<String>,
}

impl Interaction {
    /// Human-readable label used in deletion pickers: `date - name (target, event)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} - {} ({}, {})",
            self.date.format("%Y-%m-%d"),
            self.name,
            self.target,
            self.event
        )
    }

    /// Returns true when every field except the id matches.
    #[must_use]
    pub fn same_content(&self, other: &Interaction) -> bool {
        Interaction { id: other.id, ..self.clone() } == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> InteractionDraft {
        InteractionDraft::new(
            Operator::Nicole,
            "Mario Rossi",
            TargetType::Business,
            "Rossi SRL",
            Region::Marche,
            EventName::new("SITUM-FUTURE").unwrap(),
            InteractionStatus::Contacted,
            Source::Email,
        )
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let draft = draft().with_note("   ").with_phone("333 1234567");
        assert_eq!(draft.note, None);
        assert_eq!(draft.phone.as_deref(), Some("333 1234567"));
    }

    #[test]
    fn label_renders_date_name_target_event() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let interaction = draft().into_interaction(InteractionId::new(1), date);
        assert_eq!(
            interaction.label(),
            "2025-05-02 - Mario Rossi (Impresa, SITUM-FUTURE)"
        );
    }

    #[test]
    fn same_content_ignores_id() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let a = draft().into_interaction(InteractionId::new(1), date);
        let b = draft().into_interaction(InteractionId::new(9), date);
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }
}

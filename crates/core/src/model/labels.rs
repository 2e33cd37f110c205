use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Raised when a stored or submitted label does not name a known variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} label: {raw:?}")]
pub struct LabelError {
    kind: &'static str,
    raw: String,
}

impl LabelError {
    /// Error for `raw` not naming any `kind` variant.
    #[must_use]
    pub fn unknown(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_owned(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn parse_label<T: Copy>(
    kind: &'static str,
    all: &[T],
    label: impl Fn(T) -> &'static str,
    raw: &str,
) -> Result<T, LabelError> {
    let trimmed = raw.trim();
    all.iter()
        .copied()
        .find(|v| label(*v) == trimmed)
        .ok_or_else(|| LabelError::unknown(kind, raw))
}

//
// ─── OPERATOR ──────────────────────────────────────────────────────────────────
//

/// A field operator ("Angel") or the coordinator.
///
/// Identity is self-selected by the caller. Nothing here authenticates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    Nicole,
    Nadia,
    Alberto,
    Bianca,
    Vanessa,
    Giorgio,
    Coordinator,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Nicole,
        Operator::Nadia,
        Operator::Alberto,
        Operator::Bianca,
        Operator::Vanessa,
        Operator::Giorgio,
        Operator::Coordinator,
    ];

    /// Label stored in the `angel` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Nicole => "Nicole",
            Operator::Nadia => "Nadia",
            Operator::Alberto => "Alberto",
            Operator::Bianca => "Bianca",
            Operator::Vanessa => "Vanessa",
            Operator::Giorgio => "Giorgio",
            Operator::Coordinator => "Alessandro (Coordinatore)",
        }
    }

    #[must_use]
    pub fn is_coordinator(self) -> bool {
        matches!(self, Operator::Coordinator)
    }
}

//
// ─── TARGET TYPE ───────────────────────────────────────────────────────────────
//

/// Category of contact being recruited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetType {
    Business,
    Teacher,
    Student,
}

impl TargetType {
    pub const ALL: [TargetType; 3] =
        [TargetType::Business, TargetType::Teacher, TargetType::Student];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Business => "Impresa",
            TargetType::Teacher => "Docente",
            TargetType::Student => "Studente",
        }
    }
}

//
// ─── REGION ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Marche,
    Umbria,
    Abruzzo,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Marche, Region::Umbria, Region::Abruzzo];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Marche => "Marche",
            Region::Umbria => "Umbria",
            Region::Abruzzo => "Abruzzo",
        }
    }
}

//
// ─── INTERACTION STATUS ────────────────────────────────────────────────────────
//

/// Funnel stage of an interaction.
///
/// Variants are declared in funnel order, so `Ord` follows the progression.
/// No ordering is enforced when a record is written: a record may start at
/// `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionStatus {
    Contacted,
    LetterSigned,
    FormFilled,
    Paid,
}

impl InteractionStatus {
    pub const ALL: [InteractionStatus; 4] = [
        InteractionStatus::Contacted,
        InteractionStatus::LetterSigned,
        InteractionStatus::FormFilled,
        InteractionStatus::Paid,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionStatus::Contacted => "Contattato",
            InteractionStatus::LetterSigned => "Lettera firmata",
            InteractionStatus::FormFilled => "Form compilato",
            InteractionStatus::Paid => "Pagato",
        }
    }
}

//
// ─── SOURCE ────────────────────────────────────────────────────────────────────
//

/// Channel through which the contact happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    Email,
    Phone,
    Instagram,
    Website,
    Other,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Email,
        Source::Phone,
        Source::Instagram,
        Source::Website,
        Source::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Email => "Email",
            Source::Phone => "Telefono",
            Source::Instagram => "Instagram",
            Source::Website => "Sito",
            Source::Other => "Altro",
        }
    }
}

// ─── Display / FromStr ─────────────────────────────────────────────────────────

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("operator", &Self::ALL, Self::as_str, s)
    }
}

impl FromStr for TargetType {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("target", &Self::ALL, Self::as_str, s)
    }
}

impl FromStr for Region {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("region", &Self::ALL, Self::as_str, s)
    }
}

impl FromStr for InteractionStatus {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("status", &Self::ALL, Self::as_str, s)
    }
}

impl FromStr for Source {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("source", &Self::ALL, Self::as_str, s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

//! Thin wrappers over uploaded files: historical contact lists shown for
//! reference, and text attachments merged into a transcript.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use situm_core::model::InteractionDraft;

use crate::error::AttachmentError;

/// A delimited contact list, kept as text for display only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContactList {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentService;

impl AttachmentService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Read a contact list file. Rows may have differing lengths.
    ///
    /// # Errors
    ///
    /// Returns `AttachmentError` if the file cannot be read or parsed.
    pub async fn read_contact_list(&self, path: &Path) -> Result<ContactList, AttachmentError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AttachmentError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let list = parse_contact_list(&bytes)?;
        debug!(path = %path.display(), rows = list.rows.len(), "contact list loaded");
        Ok(list)
    }

    /// Read a text attachment.
    ///
    /// # Errors
    ///
    /// Returns `AttachmentError::NotText` for non UTF-8 content.
    pub async fn read_text(&self, path: &Path) -> Result<String, AttachmentError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AttachmentError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        String::from_utf8(bytes).map_err(|_| AttachmentError::NotText)
    }

    /// Append `attachment` to the draft's transcript, separated by a blank line.
    #[must_use]
    pub fn merge_transcript(
        &self,
        mut draft: InteractionDraft,
        attachment: &str,
    ) -> InteractionDraft {
        let attachment = attachment.trim();
        if attachment.is_empty() {
            return draft;
        }
        draft.transcript = Some(match draft.transcript.take() {
            Some(existing) => format!("{}\n\n{attachment}", existing.trim_end()),
            None => attachment.to_owned(),
        });
        draft
    }
}

fn parse_contact_list(bytes: &[u8]) -> Result<ContactList, AttachmentError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_owned).collect());
    }
    Ok(ContactList { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    use situm_core::model::{EventName, InteractionStatus, Operator, Region, Source, TargetType};

    fn draft() -> InteractionDraft {
        InteractionDraft::new(
            Operator::Nadia,
            "Paola",
            TargetType::Teacher,
            "",
            Region::Umbria,
            EventName::new("SITUM-PLAY").unwrap(),
            InteractionStatus::Contacted,
            Source::Email,
        )
    }

    #[test]
    fn merge_into_empty_transcript() {
        let merged = AttachmentService::new().merge_transcript(draft(), "  Oggetto: invito  \n");
        assert_eq!(merged.transcript.as_deref(), Some("Oggetto: invito"));
    }

    #[test]
    fn merge_appends_after_blank_line() {
        let draft = draft().with_transcript("Chiamata del 3 marzo.\n");
        let merged = AttachmentService::new().merge_transcript(draft, "Email di follow-up.");
        assert_eq!(
            merged.transcript.as_deref(),
            Some("Chiamata del 3 marzo.\n\nEmail di follow-up.")
        );
    }

    #[test]
    fn blank_attachment_changes_nothing() {
        let merged = AttachmentService::new().merge_transcript(draft(), "   ");
        assert_eq!(merged.transcript, None);
    }

    #[tokio::test]
    async fn reads_ragged_contact_lists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contatti.csv");
        std::fs::write(&path, "nome,email\nAnna,anna@example.org\nBruno\n").unwrap();

        let list = AttachmentService::new().read_contact_list(&path).await.unwrap();
        assert_eq!(list.headers, vec!["nome", "email"]);
        assert_eq!(list.rows.len(), 2);
        assert_eq!(list.rows[1], vec!["Bruno"]);
    }

    #[tokio::test]
    async fn missing_attachment_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = AttachmentService::new().read_text(&dir.path().join("nope.txt")).await;
        assert!(matches!(result, Err(AttachmentError::Read { .. })));
    }
}

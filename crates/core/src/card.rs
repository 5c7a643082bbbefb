//! Partial card edits.

use crate::activity::CardFields;
use crate::types::Timestamp;

/// A partial update to a card's editable fields.
///
/// `None` leaves a field unchanged. `due_at` is doubly optional so that
/// `Some(None)` can clear the due date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<Option<Timestamp>>,
}

impl CardPatch {
    /// `true` when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.due_at.is_none()
    }

    /// The fields that result from applying this patch to `current`.
    pub fn apply(&self, current: &CardFields) -> CardFields {
        CardFields {
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            due_at: self.due_at.unwrap_or(current.due_at),
        }
    }
}

impl From<CardFields> for CardPatch {
    fn from(fields: CardFields) -> Self {
        Self {
            title: Some(fields.title),
            description: Some(fields.description),
            due_at: Some(fields.due_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fields() -> CardFields {
        CardFields {
            title: "Fix bug".into(),
            description: "Crash on save".into(),
            due_at: Some(chrono::Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    #[test]
    fn default_patch_is_empty() {
        assert!(CardPatch::default().is_empty());
    }

    #[test]
    fn apply_only_overwrites_given_fields() {
        let patch = CardPatch {
            title: Some("Fix crash".into()),
            ..Default::default()
        };
        let result = patch.apply(&fields());
        assert_eq!(result.title, "Fix crash");
        assert_eq!(result.description, "Crash on save");
        assert_eq!(result.due_at, fields().due_at);
    }

    #[test]
    fn explicit_none_clears_due_date() {
        let patch = CardPatch {
            due_at: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(patch.apply(&fields()).due_at, None);
    }

    #[test]
    fn patch_from_fields_overwrites_everything() {
        let target = CardFields {
            title: "Old".into(),
            description: String::new(),
            due_at: None,
        };
        let result = CardPatch::from(target.clone()).apply(&fields());
        assert_eq!(result, target);
    }
}

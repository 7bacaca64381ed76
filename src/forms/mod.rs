//! Draft state behind the create and edit screens.
//!
//! A draft is seeded from an existing record (edit mode) or from defaults
//! (create mode). Saving is gated by [`Draft::has_content`]; the draft is then
//! converted into the store payload and handed to a save callback. The
//! resulting [`SaveOutcome`] tells the screen whether to dismiss.

use std::fmt::Display;

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod client;
pub mod expense;
pub mod job;
pub mod task;

#[derive(Debug, Error)]
/// Errors that can occur when converting draft data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("invalid line item: {0}")]
    InvalidLineItem(String),

    #[error("required field is empty")]
    MissingField,

    #[error("row {row}: client has no name")]
    MissingName { row: usize },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<TypeConstraintError> for FormError {
    fn from(val: TypeConstraintError) -> Self {
        match val {
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::InvalidAmount => FormError::InvalidAmount,
            TypeConstraintError::EmptyString => FormError::MissingField,
            other => FormError::InvalidLineItem(other.to_string()),
        }
    }
}

/// Editable state of a create/edit screen.
pub trait Draft {
    /// Value handed to the store when saving.
    type Payload;

    /// Whether the required fields are filled in; the save action is
    /// disabled otherwise.
    fn has_content(&self) -> bool;

    fn to_payload(&self) -> Result<Self::Payload, FormError>;
}

/// Result of pressing save on a form.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<T> {
    /// The record was written; the screen dismisses.
    Saved(T),
    /// Required fields are missing or invalid; nothing was written.
    Blocked,
    /// The store rejected the write; the draft stays on screen.
    Failed(String),
}

impl<T> SaveOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// Validates the draft and runs `save` with its payload.
pub fn submit<D, T, E, F>(draft: &D, save: F) -> SaveOutcome<T>
where
    D: Draft,
    E: Display,
    F: FnOnce(D::Payload) -> Result<T, E>,
{
    if !draft.has_content() {
        return SaveOutcome::Blocked;
    }

    let payload = match draft.to_payload() {
        Ok(payload) => payload,
        Err(err) => {
            log::warn!("Form is not ready to save: {err}");
            return SaveOutcome::Blocked;
        }
    };

    match save(payload) {
        Ok(saved) => SaveOutcome::Saved(saved),
        Err(err) => {
            log::error!("Failed to save form: {err}");
            SaveOutcome::Failed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoteDraft {
        text: String,
    }

    impl Draft for NoteDraft {
        type Payload = String;

        fn has_content(&self) -> bool {
            !self.text.trim().is_empty()
        }

        fn to_payload(&self) -> Result<String, FormError> {
            if self.text.contains('@') {
                return Err(FormError::InvalidEmail);
            }
            Ok(self.text.trim().to_string())
        }
    }

    #[test]
    fn empty_draft_is_blocked_without_saving() {
        let draft = NoteDraft { text: "  ".into() };
        let outcome = submit(&draft, |_| -> Result<(), String> {
            panic!("save must not run")
        });
        assert_eq!(outcome, SaveOutcome::Blocked);
    }

    #[test]
    fn invalid_payload_is_blocked() {
        let draft = NoteDraft { text: "a@b".into() };
        let outcome = submit(&draft, |_| -> Result<(), String> {
            panic!("save must not run")
        });
        assert_eq!(outcome, SaveOutcome::Blocked);
    }

    #[test]
    fn store_failure_becomes_message() {
        let draft = NoteDraft { text: "hello".into() };
        let outcome: SaveOutcome<()> = submit(&draft, |_| Err("disk full"));
        assert_eq!(outcome, SaveOutcome::Failed("disk full".to_string()));
    }

    #[test]
    fn saved_payload_is_returned() {
        let draft = NoteDraft {
            text: " hello ".into(),
        };
        let outcome = submit(&draft, |payload| Ok::<_, String>(payload.len()));
        assert!(outcome.is_saved());
        assert_eq!(outcome, SaveOutcome::Saved(5));
    }
}

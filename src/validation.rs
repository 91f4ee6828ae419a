use std::panic::{self, AssertUnwindSafe};

use crate::types::{CreateNoteRequest, FieldErrors, FormFields, NoteField, Tag};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 50;
pub const CONTENT_MAX_CHARS: usize = 500;

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_TITLE_MIN: &str = "Title must have min 3 characters";
pub const MSG_TITLE_MAX: &str = "Title must have max 50 characters";
pub const MSG_CONTENT_MAX: &str = "Content must have max 500 characters";
pub const MSG_INVALID_TAG: &str = "Invalid tag";
pub const MSG_VALIDATION_FAILED: &str = "Validation error occurred";

/// Check every rule against the form values and report all violations.
/// Never fails: a fault inside a rule becomes a generic title error.
pub fn validate_note(fields: &FormFields) -> FieldErrors {
    guarded(|| check_rules(fields))
}

/// Validate and, if clean, build the request that goes to the backend.
pub fn validated_request(fields: &FormFields) -> Result<CreateNoteRequest, FieldErrors> {
    let errors = validate_note(fields);
    if !errors.is_empty() {
        return Err(errors);
    }
    // The tag rule already passed, so this only fails if the rules drift.
    let tag: Tag = fields
        .tag
        .parse()
        .map_err(|_| FieldErrors::single(NoteField::Tag, MSG_INVALID_TAG))?;
    Ok(CreateNoteRequest {
        title: fields.title.clone(),
        content: fields.content.clone(),
        tag,
    })
}

fn check_rules(fields: &FormFields) -> FieldErrors {
    let mut errors = FieldErrors::default();

    // Lengths are counted in characters, not bytes.
    let title_len = fields.title.chars().count();
    if fields.title.is_empty() {
        errors.push(NoteField::Title, MSG_REQUIRED);
    }
    if title_len < TITLE_MIN_CHARS {
        errors.push(NoteField::Title, MSG_TITLE_MIN);
    }
    if title_len > TITLE_MAX_CHARS {
        errors.push(NoteField::Title, MSG_TITLE_MAX);
    }

    if fields.content.chars().count() > CONTENT_MAX_CHARS {
        errors.push(NoteField::Content, MSG_CONTENT_MAX);
    }

    if fields.tag.is_empty() {
        errors.push(NoteField::Tag, MSG_REQUIRED);
    }
    if fields.tag.parse::<Tag>().is_err() {
        errors.push(NoteField::Tag, MSG_INVALID_TAG);
    }

    errors
}

fn guarded(check: impl FnOnce() -> FieldErrors) -> FieldErrors {
    match panic::catch_unwind(AssertUnwindSafe(check)) {
        Ok(errors) => errors,
        Err(_) => {
            tracing::warn!("note validation panicked; reporting a generic error");
            FieldErrors::single(NoteField::Title, MSG_VALIDATION_FAILED)
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::api::ApiError;
use crate::cache::NotesCache;
use crate::draft::DraftStore;
use crate::types::{CreateNoteRequest, FieldErrors, FormFields, Note, NoteField};
use crate::validation::validated_request;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormPhase {
    Idle,
    Validating,
    Submitting,
}

/// Result of a submit attempt, inspected by the caller to decide what the
/// user sees next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// Note stored remotely; the form is reset and the view should go back.
    Created { note: Note },
    /// Validation failed; nothing was sent.
    Invalid { errors: FieldErrors },
    /// The backend rejected the request; fields and draft are kept.
    Failed { reason: String },
    /// A submission is already in flight.
    Busy,
    /// The form was torn down before the result arrived.
    Ignored,
}

/// Handed out when a submission starts; returned with the backend result.
/// Dropping it without calling `finish_submit` releases the busy flag.
#[derive(Debug)]
pub struct SubmitTicket {
    generation: u64,
    request: CreateNoteRequest,
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl SubmitTicket {
    pub fn request(&self) -> &CreateNoteRequest {
        &self.request
    }
}

/// Serializable view of the form for the frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub title: String,
    pub content: String,
    pub tag: String,
    pub errors: FieldErrors,
    pub is_submitting: bool,
    pub phase: FormPhase,
    pub has_draft: bool,
}

/// Controller of the "create note" form.
///
/// Submission is split in two halves so that the network call can run
/// without holding whatever lock guards the form: `begin_submit` validates
/// and marks the form busy, `finish_submit` applies the backend result.
pub struct NoteForm {
    fields: FormFields,
    errors: FieldErrors,
    /// Busy flag shared with the outstanding ticket. Replaced on every
    /// mount and unmount so tickets from older mounts cannot touch it.
    in_flight: Arc<AtomicBool>,
    phase: FormPhase,
    drafts: DraftStore,
    /// Incremented on every mount; tickets from older mounts are stale.
    generation: u64,
    mounted: bool,
}

impl NoteForm {
    pub fn new(drafts: DraftStore) -> Self {
        Self {
            fields: FormFields::default(),
            errors: FieldErrors::default(),
            in_flight: Arc::default(),
            phase: FormPhase::Idle,
            drafts,
            generation: 0,
            mounted: false,
        }
    }

    /// Show the form, starting from the saved draft if there is one and
    /// from empty fields otherwise. Returns whether a draft was restored.
    pub fn mount(&mut self) -> bool {
        self.generation += 1;
        self.mounted = true;
        self.in_flight = Arc::default();
        self.phase = FormPhase::Idle;
        self.errors = FieldErrors::default();
        if !self.drafts.has_draft() {
            self.fields = FormFields::default();
            return false;
        }
        self.drafts.load_draft(&mut self.fields);
        tracing::debug!(generation = self.generation, "Restored note draft");
        true
    }

    /// Tear the form down. An in-flight submission is abandoned.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.in_flight = Arc::default();
        self.phase = FormPhase::Idle;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// A ticket dropped mid-request leaves the form idle.
    pub fn phase(&self) -> FormPhase {
        if self.phase == FormPhase::Submitting && !self.is_submitting() {
            return FormPhase::Idle;
        }
        self.phase
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut DraftStore {
        &mut self.drafts
    }

    pub fn update_field(&mut self, field: NoteField, value: String) {
        self.drafts.update_field(&mut self.fields, field, value);
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    pub fn set_submitting(&mut self, is_submitting: bool) {
        self.in_flight.store(is_submitting, Ordering::SeqCst);
    }

    /// Empty the live fields. The draft is left alone.
    pub fn reset_form(&mut self) {
        self.fields = FormFields::default();
        self.errors = FieldErrors::default();
        self.set_submitting(false);
        self.phase = FormPhase::Idle;
    }

    /// Leave without submitting. The draft is kept for the next visit.
    pub fn cancel(&mut self) {
        self.errors = FieldErrors::default();
        self.unmount();
    }

    /// Throw away the work in progress.
    pub fn discard_draft(&mut self) {
        self.drafts.clear_draft();
        self.reset_form();
    }

    /// Validate the current values and, if they pass, mark the form busy and
    /// hand back the request to send. Otherwise returns the final outcome.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitOutcome> {
        if !self.mounted {
            return Err(SubmitOutcome::Ignored);
        }
        if self.is_submitting() {
            return Err(SubmitOutcome::Busy);
        }

        self.set_submitting(true);
        self.phase = FormPhase::Validating;

        match validated_request(&self.fields) {
            Ok(request) => {
                self.errors = FieldErrors::default();
                self.phase = FormPhase::Submitting;
                tracing::debug!(tag = %request.tag, "Submitting note");
                Ok(SubmitTicket {
                    generation: self.generation,
                    request,
                    in_flight: Arc::clone(&self.in_flight),
                })
            }
            Err(errors) => {
                self.errors = errors.clone();
                self.set_submitting(false);
                self.phase = FormPhase::Idle;
                Err(SubmitOutcome::Invalid { errors })
            }
        }
    }

    /// Apply the backend result of a submission started by `begin_submit`.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<Note, ApiError>,
        notes_cache: &mut NotesCache,
    ) -> SubmitOutcome {
        let current = self.mounted && ticket.generation == self.generation;

        match result {
            Ok(note) => {
                // The note exists remotely either way, so cached lists are stale.
                notes_cache.invalidate();
                // The draft is app-wide; keeping it would restore an already
                // created note on the next mount.
                self.drafts.clear_draft();
                if !current {
                    tracing::debug!("Note created after the form was closed; draft cleared");
                    return SubmitOutcome::Ignored;
                }
                self.reset_form();
                SubmitOutcome::Created { note }
            }
            Err(e) => {
                tracing::warn!("Failed to create note: {e}");
                if !current {
                    return SubmitOutcome::Ignored;
                }
                self.set_submitting(false);
                self.phase = FormPhase::Idle;
                SubmitOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            title: self.fields.title.clone(),
            content: self.fields.content.clone(),
            tag: self.fields.tag.clone(),
            errors: self.errors.clone(),
            is_submitting: self.is_submitting(),
            phase: self.phase(),
            has_draft: self.drafts.has_draft(),
        }
    }
}

use crate::api::ApiError;
use crate::form::{FormSnapshot, SubmitOutcome};
use crate::types::{NoteField, NotesPage, NotesQuery};
use crate::AppMutex;

// ─── Form ──────────────────────────────────────────────────────────────────────

/// Open the form, restoring the saved draft if there is one.
pub async fn mount_form(state: &AppMutex) -> FormSnapshot {
    let mut s = state.lock().await;
    s.form.mount();
    s.form.snapshot()
}

pub async fn unmount_form(state: &AppMutex) {
    state.lock().await.form.unmount();
}

/// One keystroke or selection: updates the live field and the saved draft.
pub async fn update_field(state: &AppMutex, field: NoteField, value: String) -> FormSnapshot {
    let mut s = state.lock().await;
    s.form.update_field(field, value);
    s.form.snapshot()
}

pub async fn cancel_form(state: &AppMutex) {
    state.lock().await.form.cancel();
}

pub async fn discard_draft(state: &AppMutex) -> FormSnapshot {
    let mut s = state.lock().await;
    s.form.discard_draft();
    s.form.snapshot()
}

pub async fn form_state(state: &AppMutex) -> FormSnapshot {
    state.lock().await.form.snapshot()
}

/// Validate and send the form. The lock is released while the request is in
/// flight; the busy flag set by `begin_submit` turns repeated clicks into
/// `SubmitOutcome::Busy` instead of a second request.
pub async fn submit_note(state: &AppMutex) -> SubmitOutcome {
    let (ticket, api) = {
        let mut s = state.lock().await;
        match s.form.begin_submit() {
            Ok(ticket) => (ticket, s.api.clone()),
            Err(outcome) => return outcome,
        }
    }; // lock released here

    let result = api.create_note(ticket.request()).await;

    let mut s = state.lock().await;
    let s = &mut *s;
    s.form.finish_submit(ticket, result, &mut s.notes_cache)
}

// ─── Notes list ────────────────────────────────────────────────────────────────

/// One page of the notes list, served from the cache when possible.
pub async fn list_notes(state: &AppMutex, query: NotesQuery) -> Result<NotesPage, ApiError> {
    let (api, epoch) = {
        let s = state.lock().await;
        if let Some(page) = s.notes_cache.get(&query) {
            return Ok(page.clone());
        }
        (s.api.clone(), s.notes_cache.epoch())
    };

    let page = api.fetch_notes(&query).await?;

    let mut s = state.lock().await;
    if !s.notes_cache.insert(epoch, query, page.clone()) {
        tracing::debug!("Notes list changed during fetch; not caching page");
    }
    Ok(page)
}

// ─── Tauri commands ────────────────────────────────────────────────────────────

#[cfg(feature = "desktop")]
pub mod desktop {
    use tauri::Emitter;

    use crate::form::{FormSnapshot, SubmitOutcome};
    use crate::types::{NoteField, NotesPage, NotesQuery, Tag};
    use crate::AppMutex;

    #[tauri::command]
    pub async fn mount_form(state: tauri::State<'_, AppMutex>) -> Result<FormSnapshot, String> {
        Ok(super::mount_form(&state).await)
    }

    #[tauri::command]
    pub async fn unmount_form(state: tauri::State<'_, AppMutex>) -> Result<(), String> {
        super::unmount_form(&state).await;
        Ok(())
    }

    #[tauri::command]
    pub async fn update_field(
        field: NoteField,
        value: String,
        state: tauri::State<'_, AppMutex>,
    ) -> Result<FormSnapshot, String> {
        Ok(super::update_field(&state, field, value).await)
    }

    /// Emits "note-created" on success so the frontend navigates back.
    #[tauri::command]
    pub async fn submit_note(
        state: tauri::State<'_, AppMutex>,
        app: tauri::AppHandle,
    ) -> Result<SubmitOutcome, String> {
        let outcome = super::submit_note(&state).await;
        if let SubmitOutcome::Created { note } = &outcome {
            let _ = app.emit("note-created", note);
        }
        Ok(outcome)
    }

    #[tauri::command]
    pub async fn cancel_form(state: tauri::State<'_, AppMutex>) -> Result<(), String> {
        super::cancel_form(&state).await;
        Ok(())
    }

    #[tauri::command]
    pub async fn discard_draft(state: tauri::State<'_, AppMutex>) -> Result<FormSnapshot, String> {
        Ok(super::discard_draft(&state).await)
    }

    #[tauri::command]
    pub async fn get_form_state(state: tauri::State<'_, AppMutex>) -> Result<FormSnapshot, String> {
        Ok(super::form_state(&state).await)
    }

    #[tauri::command]
    pub async fn list_notes(
        query: NotesQuery,
        state: tauri::State<'_, AppMutex>,
    ) -> Result<NotesPage, String> {
        super::list_notes(&state, query).await.map_err(|e| e.to_string())
    }

    /// Filter menu entries, "All" first.
    #[tauri::command]
    pub async fn get_tags() -> Vec<&'static str> {
        Tag::filter_labels()
    }
}

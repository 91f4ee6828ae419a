use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::DraftStorage;
use crate::types::{FormFields, NoteDraft, NoteField, DEFAULT_TAG};

/// Storage key holding the persisted draft.
pub const DRAFT_STORAGE_KEY: &str = "draft";

/// Bumped whenever the persisted layout changes. Values written by a newer
/// version are ignored; older ones are read as-is.
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Persisted {
    version: u32,
    state: PersistedState,
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    draft: NoteDraft,
}

/// The single in-progress note of this session, mirrored to durable storage
/// on every change.
pub struct DraftStore {
    draft: NoteDraft,
    storage: Arc<dyn DraftStorage>,
}

impl DraftStore {
    /// Restore the persisted draft, or start from the empty default.
    pub fn open(storage: Arc<dyn DraftStorage>) -> Self {
        let draft = read_persisted(storage.as_ref()).unwrap_or_default();
        Self { draft, storage }
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    /// Replace the draft wholesale. Any strings are accepted.
    pub fn set_draft(&mut self, draft: NoteDraft) {
        self.draft = draft;
        self.persist();
    }

    /// Apply one edit to the live form fields and the draft together.
    pub fn update_field(&mut self, fields: &mut FormFields, field: NoteField, value: String) {
        let mut draft = self.draft.clone();
        match field {
            NoteField::Title => draft.title = value.clone(),
            NoteField::Content => draft.content = value.clone(),
            NoteField::Tag => draft.tag = value.clone(),
        }
        fields.set(field, value);
        self.draft = draft;
        self.persist();
    }

    pub fn clear_draft(&mut self) {
        self.draft = NoteDraft::default();
        self.persist();
    }

    /// Copy the draft into the live form fields.
    pub fn load_draft(&self, fields: &mut FormFields) {
        *fields = FormFields::from(&self.draft);
    }

    /// True when the draft holds anything beyond the empty default.
    pub fn has_draft(&self) -> bool {
        !self.draft.title.is_empty()
            || !self.draft.content.is_empty()
            || self.draft.tag != DEFAULT_TAG.as_str()
    }

    fn persist(&self) {
        let persisted = Persisted {
            version: DRAFT_SCHEMA_VERSION,
            state: PersistedState { draft: self.draft.clone() },
        };
        let json = match serde_json::to_string(&persisted) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize draft: {e}");
                return;
            }
        };
        // The in-memory draft stays authoritative even if the write fails.
        if let Err(e) = self.storage.write(DRAFT_STORAGE_KEY, &json) {
            tracing::warn!("Failed to persist draft: {e}");
        }
    }
}

fn read_persisted(storage: &dyn DraftStorage) -> Option<NoteDraft> {
    let raw = match storage.read(DRAFT_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read persisted draft: {e}");
            return None;
        }
    };
    let persisted: Persisted = match serde_json::from_str(&raw) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Discarding unreadable persisted draft: {e}");
            return None;
        }
    };
    if persisted.version > DRAFT_SCHEMA_VERSION {
        tracing::warn!(
            version = persisted.version,
            "Discarding draft written by a newer schema version"
        );
        return None;
    }
    Some(persisted.state.draft)
}

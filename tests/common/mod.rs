#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use notehub::api::{ApiError, NotesApi};
use notehub::config::AppConfig;
use notehub::db::{DraftStorage, MemoryStorage};
use notehub::types::{CreateNoteRequest, Note, NotesPage, NotesQuery};
use notehub::{AppMutex, AppState};

/// In-process stand-in for the notes backend.
#[derive(Default)]
pub struct FakeApi {
    pub create_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub requests: Mutex<Vec<CreateNoteRequest>>,
    pub fail_create: AtomicBool,
    /// When set, `create_note` waits for `release` before answering.
    pub hold: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl FakeApi {
    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotesApi for FakeApi {
    async fn fetch_notes(&self, query: &NotesQuery) -> Result<NotesPage, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(NotesPage {
            notes: Vec::new(),
            total_pages: query.page,
        })
    }

    async fn create_note(&self, payload: &CreateNoteRequest) -> Result<Note, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(payload.clone());
        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(Note {
            id: format!("note-{}", self.creates()),
            title: payload.title.clone(),
            content: payload.content.clone(),
            tag: payload.tag.to_string(),
            created_at: Some("2025-01-01T00:00:00.000Z".into()),
            updated_at: None,
        })
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None)
}

pub fn app(storage: Arc<dyn DraftStorage>, api: Arc<FakeApi>) -> Arc<AppMutex> {
    Arc::new(AppMutex::new(AppState::new(test_config(), storage, api)))
}

pub fn memory_app(api: Arc<FakeApi>) -> Arc<AppMutex> {
    app(Arc::new(MemoryStorage::default()), api)
}

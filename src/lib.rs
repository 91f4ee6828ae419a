pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod draft;
pub mod form;
pub mod types;
pub mod validation;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::{HttpNotesApi, NotesApi};
use crate::cache::NotesCache;
use crate::config::AppConfig;
use crate::db::{DraftStorage, SqliteStorage};
use crate::draft::DraftStore;
use crate::form::NoteForm;

/// All runtime state shared by the frontend commands.
pub struct AppState {
    pub config: AppConfig,
    /// Remote notes collection. Cloned out of the lock before any request.
    pub api: Arc<dyn NotesApi>,
    /// The "create note" form together with its persisted draft.
    pub form: NoteForm,
    /// Pages of the notes list fetched so far.
    pub notes_cache: NotesCache,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn DraftStorage>, api: Arc<dyn NotesApi>) -> Self {
        Self {
            config,
            api,
            form: NoteForm::new(DraftStore::open(storage)),
            notes_cache: NotesCache::default(),
        }
    }

    /// Open the draft database and the HTTP client described by `config`.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let storage = SqliteStorage::open(&config.draft_db_path())?;
        let api = HttpNotesApi::new(&config)?;
        tracing::debug!(api = %config.api_base_url, "Application state ready");
        Ok(Self::new(config, Arc::new(storage), Arc::new(api)))
    }
}

/// Type alias used in command signatures and background tasks.
pub type AppMutex = Mutex<AppState>;

/// Install the log subscriber. Only WARN and above in release builds so
/// note content never reaches the logs.
pub fn init_logging() {
    #[cfg(debug_assertions)]
    let _ = tracing_subscriber::fmt().try_init();
    #[cfg(not(debug_assertions))]
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    init_logging();
    tauri::Builder::default()
        .setup(|app| {
            let mut config = AppConfig::from_env();
            if std::env::var_os("NOTEHUB_DATA_DIR").is_none() {
                if let Ok(dir) = app.path().app_data_dir() {
                    config.data_dir = dir;
                }
            }
            let state = AppState::from_config(config)?;
            app.manage(AppMutex::new(state));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::desktop::mount_form,
            commands::desktop::unmount_form,
            commands::desktop::update_field,
            commands::desktop::submit_note,
            commands::desktop::cancel_form,
            commands::desktop::discard_draft,
            commands::desktop::get_form_state,
            commands::desktop::list_notes,
            commands::desktop::get_tags,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://notehub-public.goit.study/api";

const DRAFT_DB_FILE: &str = "notehub.sqlite";

/// Runtime settings, resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the notes REST API, without a trailing slash.
    pub api_base_url: String,
    /// Bearer token sent with every API request.
    pub api_token: Option<String>,
    /// Directory holding the local draft database.
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("NOTEHUB_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let api_token = lookup("NOTEHUB_TOKEN").filter(|v| !v.is_empty());
        let data_dir = lookup("NOTEHUB_DATA_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir(&lookup));
        Self {
            api_base_url,
            api_token,
            data_dir,
        }
    }

    pub fn draft_db_path(&self) -> PathBuf {
        self.data_dir.join(DRAFT_DB_FILE)
    }
}

/// Per-user data directory. Falls back to the working directory when the
/// usual variables are missing.
fn default_data_dir(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(app_data) = lookup("APPDATA") {
            return PathBuf::from(app_data).join("NoteHub");
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home) = lookup("HOME") {
            return PathBuf::from(home).join(".config").join("notehub");
        }
    }

    PathBuf::from(".")
}

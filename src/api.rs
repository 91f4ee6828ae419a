use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::AppConfig;
use crate::types::{CreateNoteRequest, Note, NotesPage, NotesQuery};

/// Page size requested from the backend.
pub const NOTES_PER_PAGE: u32 = 12;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid api token")]
    InvalidToken,
}

/// The remote notes collection.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn fetch_notes(&self, query: &NotesQuery) -> Result<NotesPage, ApiError>;

    async fn create_note(&self, payload: &CreateNoteRequest) -> Result<Note, ApiError>;
}

/// REST client for the NoteHub backend.
pub struct HttpNotesApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotesApi {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    fn notes_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn fetch_notes(&self, query: &NotesQuery) -> Result<NotesPage, ApiError> {
        let response = self
            .client
            .get(self.notes_url())
            .query(&query_params(query))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_body(status, &body)
    }

    async fn create_note(&self, payload: &CreateNoteRequest) -> Result<Note, ApiError> {
        let response = self.client.post(self.notes_url()).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let note: Note = decode_body(status, &body)?;
        tracing::debug!(id = %note.id, tag = %note.tag, "Note created");
        Ok(note)
    }
}

/// Query string for a list request. Empty search and the "all tags" filter
/// are left out entirely.
pub fn query_params(query: &NotesQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.max(1).to_string()),
        ("perPage", NOTES_PER_PAGE.to_string()),
    ];
    if !query.search.is_empty() {
        params.push(("search", query.search.clone()));
    }
    if let Some(tag) = query.tag {
        params.push(("tag", tag.as_str().to_string()));
    }
    params
}

fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Status {
            status,
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

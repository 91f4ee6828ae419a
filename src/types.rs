use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of note categories accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Todo,
    Work,
    Personal,
    Meeting,
    Shopping,
}

/// Tag preselected in a fresh form and stored in an empty draft.
pub const DEFAULT_TAG: Tag = Tag::Todo;

/// Label of the filter entry that means "no tag filter".
pub const ALL_TAGS_FILTER: &str = "All";

impl Tag {
    pub const ALL: [Tag; 5] = [Tag::Todo, Tag::Work, Tag::Personal, Tag::Meeting, Tag::Shopping];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Todo => "Todo",
            Tag::Work => "Work",
            Tag::Personal => "Personal",
            Tag::Meeting => "Meeting",
            Tag::Shopping => "Shopping",
        }
    }

    /// Resolve a filter slug from the notes list. `All` and unknown slugs
    /// mean no filtering.
    pub fn from_filter(slug: &str) -> Option<Tag> {
        if slug == ALL_TAGS_FILTER {
            return None;
        }
        slug.parse().ok()
    }

    /// Entries of the sidebar filter menu, in display order.
    pub fn filter_labels() -> Vec<&'static str> {
        std::iter::once(ALL_TAGS_FILTER)
            .chain([Tag::Work, Tag::Personal, Tag::Meeting, Tag::Shopping, Tag::Todo].map(Tag::as_str))
            .collect()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag: {0:?}")]
pub struct UnknownTag(pub String);

impl FromStr for Tag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Editable field of the note form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteField {
    Title,
    Content,
    Tag,
}

impl NoteField {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteField::Title => "title",
            NoteField::Content => "content",
            NoteField::Tag => "tag",
        }
    }
}

/// An unsubmitted, possibly invalid note. The tag is free text here so that
/// whatever was persisted can be restored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tag: String,
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tag: DEFAULT_TAG.as_str().to_string(),
        }
    }
}

/// Live values of the form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub title: String,
    pub content: String,
    pub tag: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tag: DEFAULT_TAG.as_str().to_string(),
        }
    }
}

impl FormFields {
    pub fn get(&self, field: NoteField) -> &str {
        match field {
            NoteField::Title => &self.title,
            NoteField::Content => &self.content,
            NoteField::Tag => &self.tag,
        }
    }

    pub fn set(&mut self, field: NoteField, value: String) {
        match field {
            NoteField::Title => self.title = value,
            NoteField::Content => self.content = value,
            NoteField::Tag => self.tag = value,
        }
    }
}

impl From<&NoteDraft> for FormFields {
    fn from(draft: &NoteDraft) -> Self {
        Self {
            title: draft.title.clone(),
            content: draft.content.clone(),
            tag: draft.tag.clone(),
        }
    }
}

/// Validation messages keyed by field. Every violated rule is listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
}

impl FieldErrors {
    pub fn single(field: NoteField, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: NoteField, message: impl Into<String>) {
        self.get_mut(field).push(message.into());
    }

    pub fn get(&self, field: NoteField) -> &[String] {
        match field {
            NoteField::Title => &self.title,
            NoteField::Content => &self.content,
            NoteField::Tag => &self.tag,
        }
    }

    /// Message shown inline next to the field.
    pub fn first(&self, field: NoteField) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty() && self.tag.is_empty()
    }

    fn get_mut(&mut self, field: NoteField) -> &mut Vec<String> {
        match field {
            NoteField::Title => &mut self.title,
            NoteField::Content => &mut self.content,
            NoteField::Tag => &mut self.tag,
        }
    }
}

/// Payload for note creation. Only built from validated fields, so the tag
/// is always one of the known categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub tag: Tag,
}

/// A note as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One page of the notes collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub total_pages: u32,
}

/// Parameters of a notes list request. Also the key of the notes cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotesQuery {
    pub page: u32,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub tag: Option<Tag>,
}

impl Default for NotesQuery {
    fn default() -> Self {
        Self { page: 1, search: String::new(), tag: None }
    }
}

impl NotesQuery {
    pub fn new(page: u32, search: impl Into<String>, tag: Option<Tag>) -> Self {
        Self { page: page.max(1), search: search.into(), tag }
    }

    /// First page of the list opened through a tag filter slug.
    pub fn for_filter(slug: &str) -> Self {
        Self { tag: Tag::from_filter(slug), ..Self::default() }
    }

    /// A new search term restarts from the first page.
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self { page: 1, search: search.into(), tag: self.tag }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self { page: page.max(1), ..self.clone() }
    }
}

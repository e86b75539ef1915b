//! The journal note entity.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::NoteFormData;

/// Represents a single journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title
    pub title: String,
    /// Note content in Markdown format
    pub content: String,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// Last content modification time
    pub updated_at: DateTime<Utc>,
    /// Whitespace-delimited tokens in `content`
    pub word_count: usize,
    #[serde(default)]
    pub is_favorite: bool,
    /// Tags for organization, in entry order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Note {
    /// Creates a new note from form data, stamped with the current time
    pub fn new(form: NoteFormData) -> Self {
        Self::new_at(form, Utc::now())
    }

    pub(crate) fn new_at(form: NoteFormData, now: DateTime<Utc>) -> Self {
        let word_count = count_words(&form.content);

        Note {
            id: Uuid::new_v4().to_string(),
            title: form.title,
            content: form.content,
            created_at: now,
            updated_at: now,
            word_count,
            is_favorite: false,
            tags: form.tags.unwrap_or_default(),
        }
    }

    /// Replaces the editable fields and refreshes `updated_at`.
    /// `id`, `created_at` and `is_favorite` are left alone.
    pub fn apply(&mut self, form: NoteFormData) {
        self.word_count = count_words(&form.content);
        self.title = form.title;
        self.content = form.content;
        self.tags = form.tags.unwrap_or_default();
        self.updated_at = Utc::now().max(self.updated_at);
    }

    pub fn toggle_favorite(&mut self) {
        self.is_favorite = !self.is_favorite;
    }

    pub fn has_any_tag(&self, wanted: &[String]) -> bool {
        wanted.iter().any(|tag| self.tags.contains(tag))
    }
}

/// Number of whitespace-separated, non-empty tokens in `content`
pub fn count_words(content: &str) -> usize {
    content.split_whitespace().count()
}

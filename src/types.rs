//! Core data structures for the mindline application.
//!
//! This module contains the request/response shapes shared by the note store,
//! the statistics and filter engines, and the command line front end.
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::MindlineError;

/// A specialized Result type for mindline operations.
pub type Result<T> = std::result::Result<T, MindlineError>;

/// Input supplied by the form layer on every create/update call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFormData {
    pub title: String,
    pub content: String,
    /// Absent tags are stored as an empty list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NoteFormData {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Aggregate counters derived from a snapshot of the journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesStats {
    pub total_notes: usize,
    pub total_words: usize,
    pub current_streak: usize,
    pub longest_streak: usize,
    pub notes_this_month: usize,
}

/// Inclusive bounds on a note's creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

/// Optional predicates applied to the note collection. Unset fields pass everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesFilter {
    pub search_term: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub date_range: Option<DateRange>,
}

/// Available subcommands for the mindline application
#[derive(Subcommand)]
pub enum Commands {
    /// Write a new journal entry
    Create {
        /// Title of the entry
        #[clap(short = 'T', long)]
        title: String,

        /// Content of the entry, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Tags to associate with the entry (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Path to a file containing the entry's content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// View an entry by ID
    View {
        /// ID of the entry to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List entries, most recently modified first
    List {
        /// Case-insensitive text to look for in title or content
        #[clap(short, long)]
        search: Option<String>,

        /// Only entries carrying any of these tags (comma-separated)
        #[clap(short, long)]
        tag: Option<String>,

        /// Only favorite entries
        #[clap(short = 'F', long)]
        favorites: bool,

        /// Only entries created on or after this date (YYYY-MM-DD)
        #[clap(long)]
        from: Option<String>,

        /// Only entries created on or before this date (YYYY-MM-DD)
        #[clap(long)]
        to: Option<String>,

        /// Limit the number of entries returned (0 shows all)
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,

        /// Only show entry IDs and titles
        #[clap(short, long)]
        brief: bool,
    },

    /// Edit an existing entry
    Edit {
        /// ID of the entry to edit
        id: String,

        /// New title for the entry
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the entry
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Replace the entry's tags (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Path to a file containing the new content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete an entry by ID
    Delete {
        /// ID of the entry to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Mark or unmark an entry as favorite
    Favorite {
        /// ID of the entry
        id: String,
    },

    /// Show journaling statistics
    Stats {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Export entries to a file
    Export {
        /// Path where the export will be written
        #[clap(short, long)]
        output: PathBuf,

        /// Format to export to
        #[clap(short, long, value_parser = ["markdown", "json", "html"], default_value = "markdown")]
        format: String,

        /// Only export entries carrying this tag
        #[clap(short, long)]
        tag: Option<String>,
    },

    /// Start an anonymous support chat
    Chat,

    /// Browse saved chat conversations
    History {
        #[clap(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}

/// Operations on the saved conversation history
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List saved conversations, newest first
    List {
        /// Page to show (starting at 1)
        #[clap(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Print a saved conversation
    Show {
        /// ID of the conversation
        id: String,
    },

    /// Delete a saved conversation
    Delete {
        /// ID of the conversation
        id: String,
    },

    /// Write a saved conversation as a printable HTML page
    Export {
        /// ID of the conversation
        id: String,

        /// Path of the HTML file to write
        #[clap(short, long)]
        output: PathBuf,
    },
}

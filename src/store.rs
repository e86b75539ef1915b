//! The journal note store.
//!
//! Holds the whole collection in memory and rewrites the persisted snapshot after
//! every mutation. Persistence problems never fail the caller: reads fall back to an
//! empty journal and failed writes are logged and remembered until the next
//! successful write.
use std::{collections::HashSet, path::PathBuf};

use chrono::{DateTime, Local, TimeZone};
use log::{debug, error, info, warn};

use crate::{
    compute_stats, filter_notes, JsonSlot, MindlineError, Note, NoteFormData, NotesFilter,
    NotesStats, Result,
};

/// In-memory journal backed by a single JSON slot.
pub struct NoteStore {
    /// Where snapshots are read from and written to
    slot: JsonSlot,

    /// Notes in insertion order
    notes: Vec<Note>,

    /// Set when the last snapshot write failed
    dirty: bool,

    last_persist_error: Option<String>,
}

impl NoteStore {
    /// Opens the store at `path` and loads whatever snapshot is there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            slot: JsonSlot::new(path),
            notes: Vec::new(),
            dirty: false,
            last_persist_error: None,
        };
        store.load();
        store
    }

    /// Replaces the in-memory collection with the persisted snapshot.
    ///
    /// # Returns
    ///
    /// The number of notes loaded. Missing or malformed data yields an empty
    /// collection; the problem is logged, never returned.
    pub fn load(&mut self) -> usize {
        self.notes = match self.slot.read::<Note>() {
            Ok(Some(records)) => match validate(records) {
                Ok(notes) => notes,
                Err(e) => {
                    error!(
                        "Discarding notes from {}: {}",
                        self.slot.path().display(),
                        e
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!(
                    "No notes stored at {} yet",
                    self.slot.path().display()
                );
                Vec::new()
            }
            Err(e) => {
                error!(
                    "Error loading notes from {}: {}",
                    self.slot.path().display(),
                    e
                );
                Vec::new()
            }
        };

        info!("Loaded {} notes", self.notes.len());
        self.notes.len()
    }

    /// Creates a note from form data, persists the collection and returns the note
    pub fn create(&mut self, form: NoteFormData) -> Note {
        let note = Note::new(form);
        info!("Creating note: {}", note.id);

        self.notes.push(note.clone());
        self.persist();
        note
    }

    /// Replaces the title, content and tags of the note with `id`.
    ///
    /// # Returns
    ///
    /// The updated note, or `None` when no note has that id (nothing changes then)
    pub fn update(&mut self, id: &str, form: NoteFormData) -> Option<Note> {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            debug!("Cannot update note {}: not found", id);
            return None;
        };

        note.apply(form);
        let updated = note.clone();
        info!("Updated note: {}", id);

        self.persist();
        Some(updated)
    }

    /// Removes the note with `id` and persists the collection.
    ///
    /// Returns whether a note was removed; an unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        let removed = self.notes.len() != before;

        if removed {
            info!("Deleted note: {}", id);
        } else {
            debug!("Delete of unknown note {} ignored", id);
        }

        self.persist();
        removed
    }

    /// Flips the favorite flag of the note with `id` without touching `updated_at`.
    ///
    /// Returns whether a note matched.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let matched = match self.notes.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                note.toggle_favorite();
                debug!("Note {} favorite = {}", id, note.is_favorite);
                true
            }
            None => {
                debug!("Toggle favorite of unknown note {} ignored", id);
                false
            }
        };

        self.persist();
        matched
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// All notes in insertion order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Statistics for the current snapshot, evaluated against the local clock
    pub fn stats(&self) -> NotesStats {
        self.stats_at(&Local::now())
    }

    pub fn stats_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NotesStats {
        compute_stats(&self.notes, now)
    }

    /// Notes matching `filter`, most recently modified first
    pub fn filter(&self, filter: &NotesFilter) -> Vec<Note> {
        filter_notes(&self.notes, filter)
    }

    /// True when the persisted snapshot is behind the in-memory collection
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Writes the current snapshot, returning any failure to the caller
    pub fn flush(&mut self) -> Result<()> {
        match self.slot.write(&self.notes) {
            Ok(()) => {
                self.dirty = false;
                self.last_persist_error = None;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                self.last_persist_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Best-effort snapshot write after a mutation
    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            warn!(
                "Error saving notes to {}: {}",
                self.slot.path().display(),
                e
            );
        }
    }
}

/// Rejects snapshots whose ids are empty or repeated
fn validate(notes: Vec<Note>) -> Result<Vec<Note>> {
    {
        let mut seen = HashSet::with_capacity(notes.len());
        for note in &notes {
            if note.id.is_empty() {
                return Err(MindlineError::InvalidFormat {
                    message: "note with an empty id".to_string(),
                });
            }
            if !seen.insert(note.id.as_str()) {
                return Err(MindlineError::InvalidFormat {
                    message: format!("duplicate note id {}", note.id),
                });
            }
        }
    }
    Ok(notes)
}

//! Filtered, sorted views over the note collection.
use log::trace;

use crate::{Note, NotesFilter};

/// Returns the notes matching every predicate set in `filter`, most recently
/// modified first.
///
/// Unset predicates (and an empty search term or tag list) pass every note.
pub fn filter_notes(notes: &[Note], filter: &NotesFilter) -> Vec<Note> {
    let search = filter
        .search_term
        .as_deref()
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    let tags = filter.tags.as_deref().filter(|tags| !tags.is_empty());

    let mut matched: Vec<Note> = notes
        .iter()
        .filter(|note| search.as_deref().map_or(true, |term| matches_search(note, term)))
        .filter(|note| tags.map_or(true, |wanted| note.has_any_tag(wanted)))
        .filter(|note| {
            filter
                .is_favorite
                .map_or(true, |favorite| note.is_favorite == favorite)
        })
        .filter(|note| {
            filter
                .date_range
                .as_ref()
                .map_or(true, |range| range.contains(&note.created_at))
        })
        .cloned()
        .collect();

    matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    trace!("Filter matched {} of {} notes", matched.len(), notes.len());
    matched
}

/// Case-insensitive substring match on title or content; `term` must already be lowercase
fn matches_search(note: &Note, term: &str) -> bool {
    note.title.to_lowercase().contains(term) || note.content.to_lowercase().contains(term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::{DateRange, NoteFormData};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn note(title: &str, content: &str, tags: &[&str], created: DateTime<Utc>) -> Note {
        Note::new_at(
            NoteFormData::new(title, content).with_tags(tags.iter().copied()),
            created,
        )
    }

    fn sample() -> Vec<Note> {
        vec![
            note("Run", "5k along the river", &["sport"], at(1, 9)),
            note("Eat", "tried a new soup", &["food"], at(2, 9)),
        ]
    }

    fn titles(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.title.as_str()).collect()
    }

    #[test]
    fn tag_filter_returns_tagged_note_only() {
        let filter = NotesFilter {
            tags: Some(vec!["sport".to_string()]),
            ..Default::default()
        };

        assert_eq!(titles(&filter_notes(&sample(), &filter)), vec!["Run"]);
    }

    #[test]
    fn search_is_case_insensitive_on_title() {
        let filter = NotesFilter {
            search_term: Some("run".to_string()),
            ..Default::default()
        };

        assert_eq!(titles(&filter_notes(&sample(), &filter)), vec!["Run"]);
    }

    #[test]
    fn search_also_looks_at_content() {
        let filter = NotesFilter {
            search_term: Some("SOUP".to_string()),
            ..Default::default()
        };

        assert_eq!(titles(&filter_notes(&sample(), &filter)), vec!["Eat"]);
    }

    #[test]
    fn tags_match_any() {
        let filter = NotesFilter {
            tags: Some(vec!["food".to_string(), "sport".to_string()]),
            ..Default::default()
        };

        assert_eq!(filter_notes(&sample(), &filter).len(), 2);
    }

    #[test]
    fn empty_filter_returns_everything_newest_update_first() {
        let mut notes = sample();
        notes[0].updated_at = at(3, 9);

        let result = filter_notes(&notes, &NotesFilter::default());
        assert_eq!(titles(&result), vec!["Run", "Eat"]);
    }

    #[test]
    fn empty_search_and_tags_impose_nothing() {
        let filter = NotesFilter {
            search_term: Some(String::new()),
            tags: Some(Vec::new()),
            ..Default::default()
        };

        assert_eq!(filter_notes(&sample(), &filter).len(), 2);
    }

    #[test]
    fn favorite_flag_is_an_exact_match() {
        let mut notes = sample();
        notes[1].is_favorite = true;

        let favorites = NotesFilter {
            is_favorite: Some(true),
            ..Default::default()
        };
        let others = NotesFilter {
            is_favorite: Some(false),
            ..Default::default()
        };

        assert_eq!(titles(&filter_notes(&notes, &favorites)), vec!["Eat"]);
        assert_eq!(titles(&filter_notes(&notes, &others)), vec!["Run"]);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let notes = sample();
        let exact = NotesFilter {
            date_range: Some(DateRange::new(at(1, 9), at(1, 9))),
            ..Default::default()
        };
        let after = NotesFilter {
            date_range: Some(DateRange::new(at(1, 9) + Duration::seconds(1), at(2, 9))),
            ..Default::default()
        };

        assert_eq!(titles(&filter_notes(&notes, &exact)), vec!["Run"]);
        assert_eq!(titles(&filter_notes(&notes, &after)), vec!["Eat"]);
    }

    #[test]
    fn predicates_are_combined_with_and() {
        let filter = NotesFilter {
            search_term: Some("run".to_string()),
            tags: Some(vec!["food".to_string()]),
            ..Default::default()
        };

        assert!(filter_notes(&sample(), &filter).is_empty());
    }
}

//! Statistics derived from a snapshot of the journal.
//!
//! Everything here is recomputed from scratch on every call. Calendar questions
//! (which day a note belongs to, which month is "this month") are answered in the
//! time zone of the supplied `now`.
use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

use crate::{Note, NotesStats};

/// Builds the full statistics record for `notes` as seen at `now`
pub fn compute_stats<Tz: TimeZone>(notes: &[Note], now: &DateTime<Tz>) -> NotesStats {
    let tz = now.timezone();
    let today = now.date_naive();

    let total_words = notes.iter().map(|note| note.word_count).sum();

    let notes_this_month = notes
        .iter()
        .map(|note| note.created_at.with_timezone(&tz).date_naive())
        .filter(|date| date.year() == today.year() && date.month() == today.month())
        .count();

    let dates = distinct_dates_desc(notes, &tz);

    NotesStats {
        total_notes: notes.len(),
        total_words,
        current_streak: current_streak(&dates, today),
        longest_streak: longest_streak(&dates),
        notes_this_month,
    }
}

/// Distinct calendar dates (in `tz`) on which at least one note was created,
/// most recent first
pub fn distinct_dates_desc<Tz: TimeZone>(notes: &[Note], tz: &Tz) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = notes
        .iter()
        .map(|note| note.created_at.with_timezone(tz).date_naive())
        .collect();

    dates.into_iter().rev().collect()
}

/// Consecutive days with a note, counting back from `today`. Zero when today has none.
pub fn current_streak(dates_desc: &[NaiveDate], today: NaiveDate) -> usize {
    let days: BTreeSet<&NaiveDate> = dates_desc.iter().collect();

    let mut streak = 0;
    let mut day = Some(today);
    while let Some(current) = day {
        if !days.contains(&current) {
            break;
        }
        streak += 1;
        day = current.pred_opt();
    }
    streak
}

/// Length of the longest run of adjacent calendar days in a descending date list
pub fn longest_streak(dates_desc: &[NaiveDate]) -> usize {
    if dates_desc.is_empty() {
        return 0;
    }

    let mut longest = 0;
    let mut run = 0;
    for pair in dates_desc.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
        } else {
            longest = longest.max(run + 1);
            run = 0;
        }
    }
    longest.max(run + 1)
}

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{MindlineError, Result};

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| dedup_tags(t.split(',')))
        .unwrap_or_default()
}

/// Trims tags, drops empty ones and keeps the first occurrence of each
pub fn dedup_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }
    unique
}

/// Parses a `YYYY-MM-DD` date given on the command line
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        MindlineError::InvalidInput {
            message: format!("invalid date '{}' (expected YYYY-MM-DD): {}", value, e),
        }
    })
}

/// First instant of `date` in the local time zone
pub fn start_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    local_instant(date, NaiveTime::MIN)
}

/// Last representable instant of `date` in the local time zone
pub fn end_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    local_instant(date, last)
}

fn local_instant(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Generate a content preview, cut at a character boundary
pub fn content_preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Human friendly age of a timestamp relative to `now`
pub fn relative_date<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = date.with_timezone(&now.timezone());
    let days = (now.date_naive() - local.date_naive()).num_days();

    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=7 => format!("{} days ago", days),
        _ => local.format("%b %-d, %Y").to_string(),
    }
}

/// Escapes text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated_in_order() {
        let tags = parse_tags(Some(" calm, sleep ,,calm, focus ".to_string()));
        assert_eq!(tags, vec!["calm", "sleep", "focus"]);
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn dates_parse_strictly() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(
            parse_date("29/02/2024"),
            Err(MindlineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start = start_of_local_day(date);
        let end = end_of_local_day(date);

        assert!(start < end);
        assert_eq!(start.with_timezone(&Local).date_naive(), date);
        assert_eq!(end.with_timezone(&Local).date_naive(), date);
    }

    #[test]
    fn preview_cuts_on_characters() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("ñandú ñandú", 5), "ñandú...");
    }

    #[test]
    fn relative_dates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let at = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 8, 0, 0).unwrap();

        assert_eq!(relative_date(&at(15), &now), "Today");
        assert_eq!(relative_date(&at(14), &now), "Yesterday");
        assert_eq!(relative_date(&at(11), &now), "4 days ago");
        assert_eq!(relative_date(&at(1), &now), "Mar 1, 2024");
    }

    #[test]
    fn html_special_characters_are_escaped() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
    }
}

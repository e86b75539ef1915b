//! Rendering of journal entries for export.
use std::{fmt::Write as _, str::FromStr};

use log::debug;
use pulldown_cmark::{html, Options, Parser};

use crate::{escape_html, MindlineError, Note, Result};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
    Html,
}

impl FromStr for ExportFormat {
    type Err = MindlineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(MindlineError::InvalidFormat {
                message: format!(
                    "Invalid export format: {}. Must be one of: markdown, json, html",
                    other
                ),
            }),
        }
    }
}

/// Renders `notes` in the requested format as a single document
pub fn export_notes(notes: &[Note], format: ExportFormat) -> Result<String> {
    debug!("Exporting {} notes as {:?}", notes.len(), format);

    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(notes)?),
        ExportFormat::Markdown => Ok(render_markdown(notes)),
        ExportFormat::Html => Ok(render_html(notes)),
    }
}

fn render_markdown(notes: &[Note]) -> String {
    let mut out = String::from("# Journal\n");
    for note in notes {
        let _ = write!(
            out,
            "\n## {}\n\n_Created {} · updated {} · {} words_\n",
            note.title,
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.updated_at.format("%Y-%m-%d %H:%M"),
            note.word_count
        );
        if !note.tags.is_empty() {
            let tags: Vec<String> = note.tags.iter().map(|t| format!("#{}", t)).collect();
            let _ = writeln!(out, "\n{}", tags.join(" "));
        }
        let _ = writeln!(out, "\n{}", note.content.trim_end());
    }
    out
}

fn render_html(notes: &[Note]) -> String {
    let mut out = String::from(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"/>\n<title>Journal</title>\n\
         <style>body{font-family:Arial,Helvetica,sans-serif;margin:24px;color:#111}\
         article{margin:0 0 32px}.meta{font-size:12px;opacity:.6}\
         .tag{display:inline-block;margin-right:6px;color:#5B3E46}</style>\n\
         </head><body>\n<h1>Journal</h1>\n",
    );

    for note in notes {
        let _ = write!(
            out,
            "<article>\n<h2>{}{}</h2>\n<p class=\"meta\">{} · {} words</p>\n",
            escape_html(&note.title),
            if note.is_favorite { " ★" } else { "" },
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.word_count
        );
        if !note.tags.is_empty() {
            out.push_str("<p>");
            for tag in &note.tags {
                let _ = write!(out, "<span class=\"tag\">#{}</span>", escape_html(tag));
            }
            out.push_str("</p>\n");
        }

        let options =
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(&note.content, options);
        html::push_html(&mut out, parser);
        out.push_str("</article>\n");
    }

    out.push_str("</body></html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoteFormData;

    fn notes() -> Vec<Note> {
        vec![
            Note::new(NoteFormData::new("Gratitude <3", "I am **thankful**").with_tags(["joy"])),
            Note::new(NoteFormData::new("Plain", "nothing special")),
        ]
    }

    #[test]
    fn formats_parse_from_cli_names() {
        assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("HTML".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn json_export_decodes_back_to_the_same_notes() {
        let notes = notes();
        let json = export_notes(&notes, ExportFormat::Json).unwrap();

        let back: Vec<Note> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, notes);
    }

    #[test]
    fn markdown_export_lists_titles_and_tags() {
        let md = export_notes(&notes(), ExportFormat::Markdown).unwrap();

        assert!(md.contains("## Gratitude <3"));
        assert!(md.contains("#joy"));
        assert!(md.contains("## Plain"));
    }

    #[test]
    fn html_export_renders_markdown_and_escapes_titles() {
        let page = export_notes(&notes(), ExportFormat::Html).unwrap();

        assert!(page.contains("<h2>Gratitude &lt;3</h2>"));
        assert!(page.contains("<strong>thankful</strong>"));
        assert!(page.contains("#joy"));
    }
}

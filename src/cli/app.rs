//! CLI module for the mindline application
//!
//! This module turns parsed commands into calls on the note store, the statistics
//! and filter engines, and the support chat.
use std::{
    fs::{self, read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use chrono::{DateTime, Local, Utc};
use console::style;
use log::{debug, info, warn};
use shell_words::split;
use tempfile::Builder;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    chat::{render_transcript_html, ChatSession, ConversationHistory, MockAssistant, Role},
    content_preview, dedup_tags, end_of_local_day, export_notes, parse_date, parse_tags,
    relative_date, start_of_local_day, Commands, Config, DateRange, ExportFormat,
    HistoryCommands, MindlineError, Note, NoteFormData, NoteStore, NotesFilter, Result,
};

/// Options of the `list` command
#[derive(Debug, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub favorites: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: usize,
    pub json: bool,
    pub brief: bool,
}

/// CLI Application handler - processes CLI commands and interfaces with NoteStore
pub struct App {
    /// The journal
    store: NoteStore,

    /// Application configuration
    config: Config,

    /// Where `config --reset` writes to
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given store and config
    pub fn new(store: NoteStore, config: Config, config_path: PathBuf, verbose: bool) -> Self {
        Self {
            store,
            config,
            config_path,
            verbose,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Create {
                title,
                content,
                edit,
                tags,
                file,
            } => self.create_note(title, content, file, tags, edit)?,

            Commands::View { id, json } => self.view_note(&id, json)?,

            Commands::List {
                search,
                tag,
                favorites,
                from,
                to,
                limit,
                json,
                brief,
            } => self.list_notes(ListOptions {
                search,
                tag,
                favorites,
                from,
                to,
                limit,
                json,
                brief,
            })?,

            Commands::Edit {
                id,
                title,
                content,
                edit,
                tags,
                file,
            } => self.edit_note(id, title, content, file, tags, edit)?,

            Commands::Delete { id, force } => self.delete_note(id, force)?,

            Commands::Favorite { id } => self.toggle_favorite(&id)?,

            Commands::Stats { json } => self.show_stats(json)?,

            Commands::Export {
                output,
                format,
                tag,
            } => self.export(&output, &format, tag)?,

            Commands::Chat => self.chat().await?,

            Commands::History { action } => self.history(action)?,

            Commands::Config { show, reset } => self.manage_config(show, reset)?,
        }

        Ok(())
    }

    fn create_note(
        &mut self,
        title: String,
        content: Option<String>,
        file: Option<PathBuf>,
        tags: Option<String>,
        open_editor: bool,
    ) -> Result<()> {
        let (content, needs_editor) = match (content, file) {
            (Some(_), Some(_)) => {
                return Err(MindlineError::InvalidInput {
                    message: "Cannot specify both --content and --file options".to_string(),
                })
            }
            (Some(c), None) => (c, open_editor),
            (None, Some(file_path)) => (read_content_from_file(&file_path)?, open_editor),
            // Nothing given on the command line, write it in the editor
            (None, None) => (String::new(), true),
        };
        let content = if needs_editor {
            self.compose_in_editor(&title, &content)?
        } else {
            content
        };

        let form = validated_form(title, content, parse_tags(tags))?;
        let note = self.store.create(form);
        self.warn_if_unsaved();

        println!("Entry created with ID: {}", note.id);
        Ok(())
    }

    fn view_note(&self, id: &str, json: bool) -> Result<()> {
        let note = self.find_note(id)?;

        if json {
            println!("{}", serde_json::to_string_pretty(note)?);
            return Ok(());
        }

        self.print_note_header(note);
        println!(
            "Updated: {} | {} words",
            note.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            note.word_count
        );
        println!("\n{}", note.content);
        Ok(())
    }

    /// List notes according to provided filters and options
    fn list_notes(&self, options: ListOptions) -> Result<()> {
        let filter = build_filter(&options)?;
        debug!("Listing notes with filter {:?}", filter);

        let mut notes = self.store.filter(&filter);
        let total = notes.len();
        if options.limit > 0 && notes.len() > options.limit {
            notes.truncate(options.limit);
        }

        if options.json {
            println!("{}", serde_json::to_string_pretty(&notes)?);
            return Ok(());
        }

        if notes.is_empty() {
            println!("No entries found matching the criteria.");
            return Ok(());
        }

        if options.brief {
            for note in &notes {
                println!("{}  {}", style(&note.id).dim(), note.title);
            }
        } else {
            self.display_notes_text(&notes);
        }

        if total > notes.len() {
            println!(
                "\nShowing {} of {} entries. Use --limit to show more.",
                notes.len(),
                total
            );
        } else {
            println!(
                "\nFound {} entr{}",
                total,
                if total == 1 { "y" } else { "ies" }
            );
        }
        Ok(())
    }

    /// Display notes in text format
    fn display_notes_text(&self, notes: &[Note]) {
        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            self.print_note_header(note);

            let preview = content_preview(&note.content, 150);
            if !preview.is_empty() {
                println!("\n{}", preview);
            }
        }
    }

    fn print_note_header(&self, note: &Note) {
        let now = Local::now();
        let favorite = if note.is_favorite { " ★" } else { "" };

        println!(
            "ID: {} | {} | {} words",
            note.id,
            relative_date(&note.created_at, &now),
            note.word_count
        );
        println!("Title: {}{}", style(&note.title).bold(), style(favorite).yellow());

        if !note.tags.is_empty() {
            let tags = note
                .tags
                .iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" ");

            println!("Tags: {}", style(tags).cyan());
        }
    }

    fn edit_note(
        &mut self,
        id: String,
        title: Option<String>,
        content: Option<String>,
        file: Option<PathBuf>,
        tags: Option<String>,
        open_editor: bool,
    ) -> Result<()> {
        if content.is_some() && file.is_some() {
            return Err(MindlineError::InvalidInput {
                message: "Cannot specify both --content and --file options".to_string(),
            });
        }

        let existing = self.find_note(&id)?.clone();

        let title = title.unwrap_or(existing.title);
        let mut content = match (content, file) {
            (Some(c), _) => c,
            (None, Some(file_path)) => {
                let content = read_content_from_file(&file_path)?;
                println!("Content updated from file: {}", file_path.display());
                content
            }
            (None, None) => existing.content,
        };
        if open_editor {
            content = self.compose_in_editor(&title, &content)?;
        }
        let tags = match tags {
            Some(tags) => parse_tags(Some(tags)),
            None => existing.tags,
        };

        let form = validated_form(title, content, tags)?;
        match self.store.update(&id, form) {
            Some(note) => {
                self.warn_if_unsaved();
                println!("Entry {} updated ({} words)", note.id, note.word_count);
                Ok(())
            }
            None => Err(MindlineError::NoteNotFound { id }),
        }
    }

    fn delete_note(&mut self, id: String, force: bool) -> Result<()> {
        let note = self.find_note(&id)?.clone();

        if !force {
            println!("You are about to delete the following entry:");
            println!("ID:      {}", note.id);
            println!("Title:   {}", note.title);
            println!("Tags:    {}", note.tags.join(", "));
            println!(
                "Created: {}",
                note.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );

            if !note.content.is_empty() {
                let preview = note.content.lines().take(2).collect::<Vec<_>>().join("\n");

                println!("\nContent preview:");
                println!(
                    "{}{}",
                    preview,
                    if note.content.lines().count() > 2 {
                        "..."
                    } else {
                        ""
                    }
                );
            }

            if !confirm("Are you sure you want to delete this entry?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.store.delete(&id);
        self.warn_if_unsaved();

        println!(
            "Entry '{}' ({}) has been permanently deleted.",
            note.title, note.id
        );
        Ok(())
    }

    fn toggle_favorite(&mut self, id: &str) -> Result<()> {
        if !self.store.toggle_favorite(id) {
            return Err(MindlineError::NoteNotFound { id: id.to_string() });
        }
        self.warn_if_unsaved();

        let favorite = self.store.get(id).is_some_and(|note| note.is_favorite);
        if favorite {
            println!("Entry {} marked as favorite", id);
        } else {
            println!("Entry {} is no longer a favorite", id);
        }
        Ok(())
    }

    fn show_stats(&self, json: bool) -> Result<()> {
        let stats = self.store.stats();

        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("{}", style("Your journal").bold());
        println!("  Entries:          {}", format_count(stats.total_notes));
        println!("  Words written:    {}", format_count(stats.total_words));
        println!("  Current streak:   {} days", stats.current_streak);
        println!("  Longest streak:   {} days", stats.longest_streak);
        println!("  This month:       {}", stats.notes_this_month);
        Ok(())
    }

    fn export(&self, output: &Path, format: &str, tag: Option<String>) -> Result<()> {
        let format: ExportFormat = format.parse()?;
        let filter = NotesFilter {
            tags: tag.map(|t| vec![t]),
            ..Default::default()
        };
        let notes = self.store.filter(&filter);

        let rendered = export_notes(&notes, format)?;
        fs::write(output, rendered)?;

        info!("Exported {} notes to {}", notes.len(), output.display());
        println!("Exported {} entries to {}", notes.len(), output.display());
        Ok(())
    }

    /// Interactive support chat; the transcript is saved to history on exit
    async fn chat(&self) -> Result<()> {
        let assistant =
            MockAssistant::new(Duration::from_millis(self.config.assistant_latency_ms))?;
        let mut session = ChatSession::new(assistant)?;

        println!("{}", style("Anonymous support chat").bold());
        println!("{}", style("Type /quit or press Ctrl-D to end the chat.").dim());
        for message in session.messages() {
            print_chat_message(message.role, &message.content);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", style(">").magenta());
            stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            if line.trim() == "/quit" {
                break;
            }

            match session.send(&line).await {
                Ok(Some(reply)) => print_chat_message(reply.role, &reply.content),
                Ok(None) => {}
                Err(e) => eprintln!("{}", style(e).red()),
            }
        }

        // Only the greeting means the user never wrote anything
        if session.messages().len() > 1 {
            let mut history = self.open_history();
            if let Some(saved) = history.save_if_needed(session.messages()) {
                println!("Conversation saved as {}", saved.id);
            }
        }
        Ok(())
    }

    fn history(&self, action: HistoryCommands) -> Result<()> {
        let mut history = self.open_history();

        match action {
            HistoryCommands::List { page } => {
                if history.is_empty() {
                    println!("No saved conversations.");
                    return Ok(());
                }
                let index = history.clamp_page(page.saturating_sub(1));
                for conversation in history.page(index) {
                    println!(
                        "{}  {}  {}",
                        style(&conversation.id).dim(),
                        conversation
                            .date
                            .with_timezone(&Local)
                            .format("%Y-%m-%d %H:%M"),
                        content_preview(conversation.summary().unwrap_or("(no messages)"), 60)
                    );
                }
                println!("\nPage {} of {}", index + 1, history.total_pages());
            }

            HistoryCommands::Show { id } => {
                let conversation = history
                    .get(&id)
                    .ok_or_else(|| MindlineError::ConversationNotFound { id: id.clone() })?;
                for message in &conversation.messages {
                    print_chat_message(message.role, &message.content);
                }
            }

            HistoryCommands::Delete { id } => {
                if !history.delete(&id) {
                    return Err(MindlineError::ConversationNotFound { id });
                }
                println!("Conversation {} deleted", id);
            }

            HistoryCommands::Export { id, output } => {
                let conversation = history
                    .get(&id)
                    .ok_or_else(|| MindlineError::ConversationNotFound { id: id.clone() })?;
                fs::write(&output, render_transcript_html(&conversation.messages))?;
                println!("Conversation written to {}", output.display());
            }
        }
        Ok(())
    }

    fn manage_config(&mut self, show: bool, reset: bool) -> Result<()> {
        if reset {
            if !confirm("Reset configuration to defaults?")? {
                println!("Reset cancelled.");
                return Ok(());
            }
            self.config = Config::default();
            self.config.save(&self.config_path)?;
            println!("Configuration reset: {}", self.config_path.display());
        }

        if show || !reset {
            println!("# {}", self.config_path.display());
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }

    fn open_history(&self) -> ConversationHistory {
        ConversationHistory::open(
            self.config.conversations_slot(),
            self.config.max_conversations,
            self.config.history_page_size,
        )
    }

    fn find_note(&self, id: &str) -> Result<&Note> {
        self.store.get(id).ok_or_else(|| MindlineError::NoteNotFound {
            id: id.to_string(),
        })
    }

    /// Tells the user when the last change only exists in memory
    fn warn_if_unsaved(&self) {
        if self.store.is_dirty() {
            let reason = self.store.last_persist_error().unwrap_or("unknown error");
            warn!("Journal snapshot not written: {}", reason);
            eprintln!(
                "{}",
                style(format!(
                    "Warning: your change could not be saved to disk ({}). It will be retried on the next change.",
                    reason
                ))
                .yellow()
            );
        }
    }

    /// Opens the configured editor on a temporary markdown file and returns what was written
    fn compose_in_editor(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        write_editor_template(&temp_path, title, existing_content)?;

        let editor_cmd = self.config.get_editor_command();
        if self.verbose {
            println!("Opening {} ...", editor_cmd);
        }
        info!("Opening editor to write entry content. Save and exit when done...");
        launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(&content))
    }
}

/// Form-layer checks before the store sees the data
fn validated_form(title: String, content: String, tags: Vec<String>) -> Result<NoteFormData> {
    if title.trim().is_empty() {
        return Err(MindlineError::InvalidInput {
            message: "Title must not be empty".to_string(),
        });
    }
    if content.trim().is_empty() {
        return Err(MindlineError::InvalidInput {
            message: "Content must not be empty".to_string(),
        });
    }

    Ok(NoteFormData::new(title.trim(), content).with_tags(dedup_tags(tags)))
}

fn build_filter(options: &ListOptions) -> Result<NotesFilter> {
    let from = options.from.as_deref().map(parse_date).transpose()?;
    let to = options.to.as_deref().map(parse_date).transpose()?;

    let date_range = match (from, to) {
        (None, None) => None,
        (from, to) => Some(DateRange::new(
            from.map(start_of_local_day)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            to.map(end_of_local_day)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )),
    };

    let tags = parse_tags(options.tag.clone());

    Ok(NotesFilter {
        search_term: options.search.clone(),
        tags: if tags.is_empty() { None } else { Some(tags) },
        is_favorite: options.favorites.then_some(true),
        date_range,
    })
}

fn read_content_from_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(MindlineError::FileNotFound {
            file_path: path.display().to_string(),
        });
    }
    read_to_string(path).map_err(MindlineError::Io)
}

fn write_editor_template(path: &Path, title: &str, existing_content: &str) -> Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;

    writeln!(file, "<!-- {} -->", title)?;
    writeln!(
        file,
        "<!-- Write your entry below. Markdown is supported. Lines that start with <!-- are ignored. -->"
    )?;
    writeln!(file)?;
    write!(file, "{}", existing_content)?;

    Ok(())
}

fn launch_editor(editor_cmd: &str, file_path: &Path) -> Result<()> {
    let args = split(editor_cmd).map_err(|e| MindlineError::EditorError {
        message: format!("Failed to parse editor command: {}", e),
    })?;

    let Some((program, rest)) = args.split_first() else {
        return Err(MindlineError::EditorError {
            message: "Empty editor command".to_string(),
        });
    };

    let status = Command::new(program).args(rest).arg(file_path).status()?;

    if !status.success() {
        return Err(MindlineError::EditorError {
            message: "Editor exited with non-zero status".to_string(),
        });
    }

    Ok(())
}

fn process_editor_content(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("<!--"))
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string()
}

fn confirm(question: &str) -> Result<bool> {
    println!("\nThis action cannot be undone!");
    print!("{} [y/N]: ", question);
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

fn print_chat_message(role: Role, content: &str) {
    match role {
        Role::User => println!("{} {}", style("you:").magenta().bold(), content),
        Role::Assistant => println!("{} {}", style("mindline:").cyan().bold(), content),
        Role::System => println!("{}", style(content).dim()),
    }
}

/// Compact counts like the stats cards: 1234 -> 1.2k
fn format_count(n: usize) -> String {
    if n >= 1000 {
        format!("{:.1}k", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_requires_title_and_content() {
        assert!(validated_form(" ".into(), "c".into(), vec![]).is_err());
        assert!(validated_form("t".into(), "\n".into(), vec![]).is_err());

        let form = validated_form(" Title ".into(), "body".into(), vec!["a".into(), "a".into()])
            .unwrap();
        assert_eq!(form.title, "Title");
        assert_eq!(form.tags, Some(vec!["a".to_string()]));
    }

    #[test]
    fn list_options_become_a_filter() {
        let filter = build_filter(&ListOptions {
            search: Some("run".into()),
            tag: Some("sport, food".into()),
            favorites: true,
            from: Some("2024-01-01".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(filter.search_term.as_deref(), Some("run"));
        assert_eq!(filter.tags, Some(vec!["sport".to_string(), "food".to_string()]));
        assert_eq!(filter.is_favorite, Some(true));
        let range = filter.date_range.unwrap();
        assert_eq!(range.end, DateTime::<Utc>::MAX_UTC);

        let unfiltered = build_filter(&ListOptions::default()).unwrap();
        assert_eq!(unfiltered, NotesFilter::default());
    }

    #[test]
    fn bad_dates_are_rejected() {
        let result = build_filter(&ListOptions {
            to: Some("yesterday".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(MindlineError::InvalidInput { .. })));
    }

    #[test]
    fn editor_comments_are_stripped() {
        let raw = "<!-- Title -->\n<!-- help -->\n\nDear diary,\ntoday was fine.\n";
        assert_eq!(process_editor_content(raw), "Dear diary,\ntoday was fine.");
    }

    #[test]
    fn counts_are_compacted_past_a_thousand() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1234), "1.2k");
    }

    #[test]
    fn edit_through_the_app_keeps_unspecified_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let store = NoteStore::open(config.notes_slot().path());
        let mut app = App::new(store, config, dir.path().join("config.json"), false);

        app.create_note(
            "Walk".into(),
            Some("park at dusk".into()),
            None,
            Some("outdoors".into()),
            false,
        )
        .unwrap();
        let id = app.store().notes()[0].id.clone();

        app.edit_note(id.clone(), None, Some("park at dawn, birds".into()), None, None, false)
            .unwrap();

        let note = app.store().get(&id).unwrap();
        assert_eq!(note.title, "Walk");
        assert_eq!(note.word_count, 4);
        assert_eq!(note.tags, vec!["outdoors"]);

        assert!(matches!(
            app.toggle_favorite("missing"),
            Err(MindlineError::NoteNotFound { .. })
        ));
        app.toggle_favorite(&id).unwrap();
        assert!(app.store().get(&id).unwrap().is_favorite);
    }
}

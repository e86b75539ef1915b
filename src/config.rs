use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{JsonSlot, MindlineError, Result};

/// File name of the notes snapshot inside the data directory
pub const NOTES_FILE: &str = "diary-notes.json";

/// File name of the saved chat conversations inside the data directory
pub const CONVERSATIONS_FILE: &str = "ml_conversations.json";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the notes and conversation snapshots
    pub data_dir: PathBuf,

    /// Editor used to write entry content
    pub editor_command: Option<String>,

    /// Maximum number of chat conversations kept in history
    pub max_conversations: usize,

    /// Conversations shown per history page
    pub history_page_size: usize,

    /// Simulated assistant response time in milliseconds
    pub assistant_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            editor_command: None,
            max_conversations: 200,
            history_page_size: 3,
            assistant_latency_ms: 600,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No configuration at {}, using defaults",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(MindlineError::Io(e)),
        };

        let config: Config =
            serde_json::from_str(&content).map_err(|e| MindlineError::ConfigError {
                message: format!("{}: {}", path.display(), e),
            })?;

        if config.history_page_size == 0 {
            return Err(MindlineError::ConfigError {
                message: "history_page_size must be at least 1".to_string(),
            });
        }

        Ok(config)
    }

    /// Writes this configuration to `path` as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| MindlineError::DirectoryError {
                path: parent.to_path_buf(),
            })?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("org", "mindline", "mindline") {
            Some(dirs) => dirs.config_dir().join("config.json"),
            None => fallback_dir().join("config.json"),
        }
    }

    pub fn notes_slot(&self) -> JsonSlot {
        JsonSlot::new(self.data_dir.join(NOTES_FILE))
    }

    pub fn conversations_slot(&self) -> JsonSlot {
        JsonSlot::new(self.data_dir.join(CONVERSATIONS_FILE))
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

fn default_data_dir() -> PathBuf {
    match ProjectDirs::from("org", "mindline", "mindline") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => fallback_dir(),
    }
}

fn fallback_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mindline")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();

        assert_eq!(config.max_conversations, 200);
        assert_eq!(config.history_page_size, 3);
        assert_eq!(config.assistant_latency_ms, 600);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"data_dir": "/tmp/journal", "history_page_size": 5}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/journal"));
        assert_eq!(config.history_page_size, 5);
        assert_eq!(config.max_conversations, 200);
        assert_eq!(
            config.notes_slot().path(),
            Path::new("/tmp/journal").join(NOTES_FILE)
        );
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "max_conversations = 3").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(MindlineError::ConfigError { .. })
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            editor_command: Some("vim".to_string()),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
        assert_eq!(config.get_editor_command(), "vim");
    }
}

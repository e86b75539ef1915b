use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    name = "mindline",
    version,
    about = "Private journal and anonymous support chat"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding journal and chat data
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the mindline application
    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HistoryCommands;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::parse_from([
            "mindline", "--data-dir", "/tmp/j", "list", "--search", "run", "--tag", "sport,food",
            "--favorites", "--from", "2024-01-01", "-n", "0",
        ]);

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/j")));
        match cli.command {
            Commands::List {
                search,
                tag,
                favorites,
                from,
                limit,
                ..
            } => {
                assert_eq!(search.as_deref(), Some("run"));
                assert_eq!(tag.as_deref(), Some("sport,food"));
                assert!(favorites);
                assert_eq!(from.as_deref(), Some("2024-01-01"));
                assert_eq!(limit, 0);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn parses_history_subcommands() {
        let cli = Cli::parse_from(["mindline", "history", "list", "--page", "2"]);
        assert!(matches!(
            cli.command,
            Commands::History {
                action: HistoryCommands::List { page: 2 }
            }
        ));
    }
}

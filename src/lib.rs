//! MindLine journal and support chat library
//!
//! This library keeps a private journal of notes with local persistence, derives
//! writing statistics (streaks, word counts) and filtered views from it, and runs an
//! anonymous support chat with a saved conversation history.

pub mod chat;
mod cli;
mod config;
mod errors;
mod export;
mod filter;
mod helper;
mod note;
mod stats;
mod storage;
mod store;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use export::*;
pub use filter::*;
pub use helper::*;
pub use note::*;
pub use stats::*;
pub use storage::*;
pub use store::*;
pub use types::*;

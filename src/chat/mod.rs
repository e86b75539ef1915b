//! Anonymous support chat: transcript handling, the assistant seam and the saved
//! conversation history.

mod assistant;
mod history;
mod session;
mod types;

pub use assistant::*;
pub use history::*;
pub use session::*;
pub use types::*;

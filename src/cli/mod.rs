//! Command line front end for the mindline application

mod app;
mod args;

pub use app::*;
pub use args::*;

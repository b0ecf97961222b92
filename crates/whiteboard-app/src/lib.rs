//! Whiteboard command-line shell.
//!
//! Validates, creates and rasterizes whiteboard documents, and replays
//! scripted input against a session without a window.

pub mod cli;
pub mod commands;
pub mod script;

pub use cli::{Cli, Command};
pub use commands::{run, DocumentSummary, ReplayOptions, ReplayReport};
pub use script::{parse_script, ReplayStep};

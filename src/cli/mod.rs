//! CLI argument parsing and command handling.

mod args;
mod validators;

pub use args::{AnnotateArgs, Cli, Command, ConfigAction};
pub use validators::{parse_confidence, parse_frame_skip};

//! Channel layer: reading from an interactive session and cleaning output.
//!
//! [`ShellReader`] polls a session for one chunk at a time, [`PatternSet`]
//! strips terminal control sequences from it and [`PatternBuffer`]
//! accumulates cleaned output for prompt detection.

mod buffer;
mod reader;
mod sanitizer;
mod session;

#[cfg(test)]
pub(crate) mod scripted;

pub use buffer::PatternBuffer;
pub use reader::{ReadOutcome, ReaderConfig, ShellReader};
pub use sanitizer::{PROMPT_ARTIFACT_RULE, PatternSet, SanitizeRule};
pub use session::InteractiveSession;

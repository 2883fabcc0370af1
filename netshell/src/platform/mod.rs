//! Platform definitions for multi-vendor support.
//!
//! A platform names its CLI modes and their prompts, the commands moving
//! between them, the output signatures that mean a command was rejected and
//! the banner quirks seen on login.

mod definition;
mod mode;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use mode::PromptMode;
pub use registry::PlatformRegistry;

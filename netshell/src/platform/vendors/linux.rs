//! Linux platform definition.
//!
//! Standard shells with `$` (user) and `#` (root) prompts. There is no
//! configuration mode: command sets run in the current shell.

use crate::channel::{PROMPT_ARTIFACT_RULE, PatternSet};
use crate::platform::{PlatformDefinition, PromptMode};

pub const PLATFORM_NAME: &str = "linux";

/// Create the Linux platform definition.
pub fn platform() -> PlatformDefinition {
    let user = PromptMode::new("user", r"[$]\s*$").unwrap();

    let root = PromptMode::new("root", r"[#]\s*$")
        .unwrap()
        .with_parent("user")
        .with_enter("sudo -i")
        .with_exit("exit")
        .with_secret_prompt(r"[Pp]assword[^:]*:\s*$")
        .unwrap();

    PlatformDefinition::new(PLATFORM_NAME)
        .with_patterns(PatternSet::standard().without_rule(PROMPT_ARTIFACT_RULE))
        .with_mode(user)
        .with_mode(root)
        .with_privileged_mode("root")
        .with_failure_pattern("command not found")
        .with_failure_pattern("No such file or directory")
        .with_failure_pattern("Permission denied")
        .with_failure_pattern("Operation not permitted")
}

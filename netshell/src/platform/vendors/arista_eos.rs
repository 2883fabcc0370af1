//! Arista EOS platform definition.
//!
//! ```text
//! switch>                     # exec
//! switch#                     # privilege_exec
//! switch(config)#             # configuration
//! switch(config-if-Et1)#      # configuration sub-mode
//! ```

use crate::channel::{PROMPT_ARTIFACT_RULE, PatternSet};
use crate::platform::{PlatformDefinition, PromptMode};

pub const PLATFORM_NAME: &str = "arista_eos";

/// Create the Arista EOS platform definition.
///
/// `(?mi)`: `^` matches at line starts, hostnames are case-insensitive.
pub fn platform() -> PlatformDefinition {
    let exec = PromptMode::new("exec", r"(?mi)^[\w.\-@()/: ]{1,63}>\s?$").unwrap();

    let privilege_exec = PromptMode::new("privilege_exec", r"(?mi)^[\w.\-@()/: ]{1,63}#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_enter("enable")
        .with_exit("disable")
        .with_secret_prompt(r"(?mi)^password:\s?$")
        .unwrap()
        .with_not_contains("(config");

    let configuration = PromptMode::new(
        "configuration",
        r"(?mi)^[\w.\-@()/: ]{1,63}\(config[\w.\-@/:+]{0,63}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_enter("configure terminal")
    .with_exit("end");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_patterns(PatternSet::standard().without_rule(PROMPT_ARTIFACT_RULE))
        .with_mode(exec)
        .with_mode(privilege_exec)
        .with_mode(configuration)
        .with_privileged_mode("privilege_exec")
        .with_config_mode("configuration")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Error")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Cannot commit")
        .with_failure_pattern("% Unavailable command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 32767")
        .with_terminal_size(32767, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arista_modes() {
        let p = platform();
        assert_eq!(p.modes.len(), 3);
        assert_eq!(p.config_mode.as_deref(), Some("configuration"));
    }

    #[test]
    fn test_arista_prompts() {
        let p = platform();
        let exec = p.get_mode("exec").unwrap();
        let privileged = p.get_mode("privilege_exec").unwrap();
        let config = p.get_mode("configuration").unwrap();

        assert!(exec.matches("admin@switch.lab>"));
        assert!(privileged.matches("switch# "));
        // "#" also ends config prompts; not_contains keeps them apart
        assert!(privileged.pattern.is_match(b"switch(config)#"));
        assert!(!privileged.matches("switch(config)#"));
        assert!(config.matches("switch(config-if-Et1)#"));
    }
}

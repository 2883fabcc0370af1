//! Cisco IOS / IOS-XE platform definition.
//!
//! The only platform allowed over telnet by the automation module.

use crate::channel::{PROMPT_ARTIFACT_RULE, PatternSet};
use crate::platform::{PlatformDefinition, PromptMode};

pub const PLATFORM_NAME: &str = "cisco_ios";

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PromptMode::new("exec", r"(?m)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    let privilege_exec = PromptMode::new("privilege_exec", r"(?m)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_enter("enable")
        .with_exit("disable")
        .with_secret_prompt(r"(?m)^[Pp]assword:\s?$")
        .unwrap()
        .with_not_contains("(conf");

    let configuration = PromptMode::new(
        "configuration",
        r"(?m)^[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,63}\)#\s?$",
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
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 512")
        .with_terminal_size(512, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_prompts() {
        let p = platform();
        assert!(p.get_mode("exec").unwrap().matches("rtr1>"));
        assert!(p.get_mode("privilege_exec").unwrap().matches("rtr1#"));
        assert!(!p.get_mode("privilege_exec").unwrap().matches("rtr1(config)#"));
        assert!(p.get_mode("configuration").unwrap().matches("rtr1(config-if)#"));
    }

    #[test]
    fn test_ios_keeps_capital_e() {
        let p = platform();
        let line = "Gi0/1 is up, line protocol is UP, STATE";
        assert_eq!(p.patterns.sanitize_str(line), line);
    }

    #[test]
    fn test_ios_failures() {
        let p = platform();
        assert!(p.detect_failure("% Invalid input detected at '^' marker.").is_some());
        assert!(p.detect_failure("Building configuration...").is_none());
    }
}

//! Cisco NX-OS platform definition.
//!
//! NX-OS logins land directly in privileged mode; there is no `>` prompt.

use crate::channel::{PROMPT_ARTIFACT_RULE, PatternSet};
use crate::platform::{PlatformDefinition, PromptMode};

pub const PLATFORM_NAME: &str = "cisco_nxos";

/// Create the Cisco NX-OS platform definition.
pub fn platform() -> PlatformDefinition {
    let privilege_exec = PromptMode::new("privilege_exec", r"(?m)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_not_contains("(config");

    let configuration = PromptMode::new(
        "configuration",
        r"(?m)^[\w.\-@/:]{1,63}\(config[\w.\-@/:+]{0,63}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_enter("configure terminal")
    .with_exit("end");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_patterns(PatternSet::standard().without_rule(PROMPT_ARTIFACT_RULE))
        .with_mode(privilege_exec)
        .with_mode(configuration)
        .with_privileged_mode("privilege_exec")
        .with_config_mode("configuration")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid command")
        .with_failure_pattern("% Invalid number")
        .with_failure_pattern("% Permission denied")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nxos_has_no_exec_mode() {
        let p = platform();
        assert_eq!(p.modes.len(), 2);
        assert!(p.get_mode("exec").is_none());
        assert!(p.get_mode("privilege_exec").unwrap().parent.is_none());
    }

    #[test]
    fn test_nxos_prompts() {
        let p = platform();
        assert!(p.get_mode("privilege_exec").unwrap().matches("nx9k-1#"));
        assert!(p.get_mode("configuration").unwrap().matches("nx9k-1(config-vlan)#"));
        assert!(!p.get_mode("privilege_exec").unwrap().matches("nx9k-1(config)#"));
    }
}

//! HP ProCurve / ArubaOS-Switch platform definition.
//!
//! These switches greet every SSH login with a "Press any key to continue"
//! banner and repaint the prompt with cursor and erase sequences, which is
//! what the standard sanitize rules are tuned for.
//!
//! # Prompt Examples
//!
//! ```text
//! HP-2920-24G>                 # operator mode
//! HP-2920-24G#                 # manager mode
//! HP-2920-24G(config)#         # configuration
//! HP-2920-24G(vlan-10)#        # context inside configuration
//! ```

use crate::platform::{PlatformDefinition, PromptMode};

pub const PLATFORM_NAME: &str = "hp_procurve";

/// Create the ProCurve platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PromptMode::new("exec", r"(?m)^[\w.\-@/: ]{1,63}>\s?$").unwrap();

    let privilege_exec = PromptMode::new("privilege_exec", r"(?m)^[\w.\-@/: ]{1,63}#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_enter("enable")
        .with_exit("disable")
        .with_secret_prompt(r"(?mi)^password:\s?$")
        .unwrap()
        .with_not_contains("(");

    let configuration = PromptMode::new(
        "configuration",
        r"(?m)^[\w.\-@/: ]{1,63}\([\w.\-@/:+]{1,32}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_enter("configure terminal")
    .with_exit("end");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_mode(exec)
        .with_mode(privilege_exec)
        .with_mode(configuration)
        .with_privileged_mode("privilege_exec")
        .with_config_mode("configuration")
        .with_continue_prompt("Press any key to continue")
        .with_failure_pattern("Invalid input")
        .with_failure_pattern("Ambiguous input")
        .with_failure_pattern("Incomplete input")
        .with_failure_pattern("Unknown command")
        .with_failure_pattern("Value out of range")
        .with_on_open_command("no page")
        .with_terminal_size(511, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procurve_platform() {
        let p = platform();
        assert_eq!(p.name, "hp_procurve");
        assert_eq!(p.modes.len(), 3);
        assert_eq!(p.continue_prompt.as_deref(), Some("Press any key to continue"));
        assert_eq!(p.on_open_commands, vec!["no page".to_string()]);
    }

    #[test]
    fn test_mode_prompts() {
        let p = platform();
        let exec = p.get_mode("exec").unwrap();
        let privileged = p.get_mode("privilege_exec").unwrap();
        let config = p.get_mode("configuration").unwrap();

        assert!(exec.matches("HP-2920-24G> "));
        assert!(!exec.matches("HP-2920-24G# "));

        assert!(privileged.matches("HP-2920-24G# "));
        assert!(!privileged.matches("HP-2920-24G(config)# "));

        assert!(config.matches("HP-2920-24G(config)# "));
        assert!(config.matches("HP-2920-24G(vlan-10)# "));
        assert!(!config.matches("HP-2920-24G# "));
    }

    #[test]
    fn test_uses_standard_rules() {
        let p = platform();
        assert_eq!(p.patterns.rules().len(), 3);
        assert_eq!(p.patterns.sanitize_str("Device E\r\n"), "Device \r\n");
    }

    #[test]
    fn test_secret_prompt() {
        let p = platform();
        let prompt = p.get_mode("privilege_exec").unwrap().secret_prompt.as_ref().unwrap();
        assert!(prompt.is_match(b"Password: "));
    }

    #[test]
    fn test_error_signature() {
        let p = platform();
        assert_eq!(
            p.detect_failure("vlan 4095\r\nValue out of range.\r\n"),
            Some("Value out of range")
        );
    }
}

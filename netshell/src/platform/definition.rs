//! Platform definition for vendor-specific configurations.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::mode::PromptMode;
use crate::channel::PatternSet;
use crate::error::PlatformError;

/// Everything netshell knows about a device family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g. "hp_procurve", "cisco_ios").
    pub name: String,

    /// CLI modes, in prompt-matching order.
    pub modes: IndexMap<String, PromptMode>,

    /// Mode reached by `enable`, if the platform has one.
    pub privileged_mode: Option<String>,

    /// Mode used for configuration command sets, if the platform has one.
    pub config_mode: Option<String>,

    /// Substrings of output that mean the device rejected a command.
    pub failed_when_contains: Vec<String>,

    /// Commands sent once after login.
    pub on_open_commands: Vec<String>,

    /// Banner text that waits for a keypress before the first prompt.
    pub continue_prompt: Option<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Rules cleaning output before prompt matching.
    pub patterns: PatternSet,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modes: IndexMap::new(),
            privileged_mode: None,
            config_mode: None,
            failed_when_contains: vec![],
            on_open_commands: vec![],
            continue_prompt: None,
            terminal_width: 511,
            terminal_height: 24,
            patterns: PatternSet::default(),
        }
    }

    /// Add a mode.
    pub fn with_mode(mut self, mode: PromptMode) -> Self {
        self.modes.insert(mode.name.clone(), mode);
        self
    }

    /// Set the mode `enable` targets.
    pub fn with_privileged_mode(mut self, name: impl Into<String>) -> Self {
        self.privileged_mode = Some(name.into());
        self
    }

    /// Set the mode configuration sets are sent in.
    pub fn with_config_mode(mut self, name: impl Into<String>) -> Self {
        self.config_mode = Some(name.into());
        self
    }

    /// Add an error signature.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set the "press any key" banner text.
    pub fn with_continue_prompt(mut self, text: impl Into<String>) -> Self {
        self.continue_prompt = Some(text.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Replace the sanitize rules.
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    /// Get a mode by name.
    pub fn get_mode(&self, name: &str) -> Option<&PromptMode> {
        self.modes.get(name)
    }

    /// First error signature found in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|sig| output.contains(sig.as_str()))
            .map(String::as_str)
    }

    /// Check that every mode reference names a defined mode.
    pub fn validate(&self) -> Result<(), PlatformError> {
        let invalid = |message: String| PlatformError::InvalidDefinition { message };

        for mode in self.modes.values() {
            if let Some(parent) = &mode.parent {
                if !self.modes.contains_key(parent) {
                    return Err(invalid(format!(
                        "{}: mode '{}' has unknown parent '{}'",
                        self.name, mode.name, parent
                    )));
                }
                if mode.enter_command.is_none() {
                    return Err(invalid(format!(
                        "{}: mode '{}' has a parent but no enter command",
                        self.name, mode.name
                    )));
                }
            }
        }

        for (role, name) in [
            ("privileged", &self.privileged_mode),
            ("config", &self.config_mode),
        ] {
            if let Some(name) = name {
                if !self.modes.contains_key(name) {
                    return Err(invalid(format!(
                        "{}: {} mode '{}' is not defined",
                        self.name, role, name
                    )));
                }
            }
        }

        Ok(())
    }

    /// One regex matching the prompt of any mode.
    pub fn prompt_pattern(&self) -> Result<Regex, regex::Error> {
        if self.modes.is_empty() {
            return Regex::new(r"[$#>]\s*$");
        }
        let combined = self
            .modes
            .values()
            .map(|mode| format!("(?:{})", mode.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&combined)
    }
}

//! CLI mode definition.

use regex::bytes::Regex;

/// A CLI mode of a network device (exec, privileged, configuration...).
///
/// Modes form a tree: each mode other than the root names its parent and
/// the commands that move between the two.
#[derive(Debug, Clone)]
pub struct PromptMode {
    /// Mode name (e.g. "exec", "privilege_exec", "configuration").
    pub name: String,

    /// Pattern matching this mode's prompt.
    pub pattern: Regex,

    /// Parent mode name, `None` for the root.
    pub parent: Option<String>,

    /// Command entering this mode from the parent.
    pub enter_command: Option<String>,

    /// Command returning from this mode to the parent.
    pub exit_command: Option<String>,

    /// Pattern of the password prompt shown while entering this mode.
    pub secret_prompt: Option<Regex>,

    /// Strings that disqualify a prompt from this mode.
    /// `#` ends both privileged and config prompts on most platforms.
    pub not_contains: Vec<String>,
}

impl PromptMode {
    /// Create a root mode from a prompt pattern.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            parent: None,
            enter_command: None,
            exit_command: None,
            secret_prompt: None,
            not_contains: vec![],
        })
    }

    /// Set the parent mode.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the command that enters this mode.
    pub fn with_enter(mut self, command: impl Into<String>) -> Self {
        self.enter_command = Some(command.into());
        self
    }

    /// Set the command that leaves this mode.
    pub fn with_exit(mut self, command: impl Into<String>) -> Self {
        self.exit_command = Some(command.into());
        self
    }

    /// Entering this mode may ask for the secret at a prompt like this.
    pub fn with_secret_prompt(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.secret_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    /// Add a not_contains string.
    pub fn with_not_contains(mut self, text: impl Into<String>) -> Self {
        self.not_contains.push(text.into());
        self
    }

    /// Check if a prompt belongs to this mode.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc.as_str())) {
            return false;
        }
        self.pattern.is_match(prompt.as_bytes())
    }
}

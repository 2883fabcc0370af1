//! Tracking and navigating CLI modes.

use indexmap::IndexMap;

use crate::error::{DriverError, Result};
use crate::platform::PromptMode;

/// One hop between adjacent modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStep {
    /// Mode reached by this hop.
    pub to: String,

    /// Command to send.
    pub command: String,

    /// Whether this hop descends into a child mode.
    pub entering: bool,
}

/// Knows the mode tree of a platform and which mode the device is in.
#[derive(Debug, Clone)]
pub struct ModeTracker {
    modes: IndexMap<String, PromptMode>,
    current: Option<String>,
}

impl ModeTracker {
    /// Create a tracker; the current mode starts unknown.
    pub fn new(modes: IndexMap<String, PromptMode>) -> Self {
        Self {
            modes,
            current: None,
        }
    }

    /// Find the mode a prompt belongs to, first match in definition order.
    pub fn determine_from_prompt(&self, prompt: &str) -> Option<&PromptMode> {
        self.modes.values().find(|mode| mode.matches(prompt))
    }

    /// Update the current mode from a prompt. Returns the mode name.
    pub fn observe(&mut self, prompt: &str) -> Option<&str> {
        let name = self.determine_from_prompt(prompt)?.name.clone();
        self.current = Some(name);
        self.current.as_deref()
    }

    /// Get the current mode.
    pub fn current(&self) -> Option<&PromptMode> {
        self.current.as_ref().and_then(|name| self.modes.get(name))
    }

    /// Get the current mode name.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Get a mode by name.
    pub fn get(&self, name: &str) -> Option<&PromptMode> {
        self.modes.get(name)
    }

    /// `name` followed by its parents up to the root.
    fn lineage(&self, name: &str) -> Result<Vec<&str>> {
        let mut chain = Vec::new();
        let mut cursor = Some(name);
        while let Some(current) = cursor {
            let mode = self.modes.get(current).ok_or_else(|| DriverError::UnknownMode {
                prompt: current.to_string(),
            })?;
            if chain.contains(&mode.name.as_str()) {
                break;
            }
            chain.push(mode.name.as_str());
            cursor = mode.parent.as_deref();
        }
        Ok(chain)
    }

    /// Steps leading from `from` to `to`: up to the closest shared
    /// ancestor using exit commands, then down using enter commands.
    pub fn plan(&self, from: &str, to: &str) -> Result<Vec<ModeStep>> {
        let no_path = || DriverError::NoModePath {
            from: from.to_string(),
            to: to.to_string(),
        };

        let up = self.lineage(from)?;
        let down = self.lineage(to)?;

        let (up_len, down_len) = up
            .iter()
            .enumerate()
            .find_map(|(i, name)| down.iter().position(|d| d == name).map(|j| (i, j)))
            .ok_or_else(no_path)?;

        let mut steps = Vec::with_capacity(up_len + down_len);

        for pair in up[..=up_len].windows(2) {
            let command = self.modes[pair[0]].exit_command.clone().ok_or_else(no_path)?;
            steps.push(ModeStep {
                to: pair[1].to_string(),
                command,
                entering: false,
            });
        }

        for pair in down[..=down_len].windows(2).rev() {
            let command = self.modes[pair[0]].enter_command.clone().ok_or_else(no_path)?;
            steps.push(ModeStep {
                to: pair[0].to_string(),
                command,
                entering: true,
            });
        }

        Ok(steps)
    }
}

//! Response type for command execution results.

use std::time::Duration;

use memchr::{memchr, memrchr};

use crate::error::{DriverError, Result};

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// Output with the command echo and trailing prompt removed.
    pub result: String,

    /// Sanitized output as read, echo and prompt included.
    pub raw_result: String,

    /// The prompt that ended the output.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Error signature matched in the output, if any.
    pub failure_message: Option<String>,
}

impl Response {
    /// Build a response, normalizing `raw_result`.
    pub fn from_raw(
        command: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        let command = command.into();
        let raw_result = raw_result.into();
        Self {
            result: normalize_output(&raw_result, &command),
            command,
            raw_result,
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed with the matched signature.
    pub fn with_failure(mut self, failure_message: impl Into<String>) -> Self {
        self.failure_message = Some(failure_message.into());
        self
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Turn a failed response into [`DriverError::CommandFailed`].
    pub fn into_result(self) -> Result<Self> {
        match &self.failure_message {
            None => Ok(self),
            Some(signature) => Err(DriverError::CommandFailed {
                message: format!("'{}' matched '{}': {}", self.command, signature, self.result),
            }
            .into()),
        }
    }

    /// Get the result lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    /// Check if the result contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.result.contains(pattern)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Drop the echoed command line and the trailing prompt line.
pub(crate) fn normalize_output(raw: &str, command: &str) -> String {
    let bytes = raw.as_bytes();

    // Echo is the first line when it ends with the command
    let body_start = match memchr(b'\n', bytes) {
        Some(pos) if !command.is_empty() && raw[..pos].trim_end().ends_with(command) => pos + 1,
        None if raw.trim_end().ends_with(command) && !command.is_empty() => raw.len(),
        _ => 0,
    };
    let body = &raw[body_start..];

    let body_end = memrchr(b'\n', body.as_bytes()).unwrap_or(0);
    body[..body_end].trim_end_matches('\r').to_string()
}

/// Concatenate raw output of a command set, the way a transcript reads.
pub fn transcript(responses: &[Response]) -> String {
    responses
        .iter()
        .map(|r| r.raw_result.as_str())
        .collect::<Vec<_>>()
        .join("")
}

//! Structured result printed by the automation module.

use serde::Serialize;

/// `{"changed": true, "response": ...}` on success,
/// `{"changed": false, "failed": true, "msg": ...}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ModuleResult {
    /// Commands were applied; `response` is the device transcript.
    pub fn changed(response: impl Into<String>) -> Self {
        Self {
            changed: true,
            failed: false,
            msg: None,
            response: Some(response.into()),
        }
    }

    /// The run failed with `msg`.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: Some(msg.into()),
            response: None,
        }
    }

    /// Attach the output read before the failure.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Serialize as one JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"changed":false,"failed":true,"msg":"unserializable result: {e}"}}"#)
        })
    }
}

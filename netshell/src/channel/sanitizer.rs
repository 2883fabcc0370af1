//! Terminal control sequence stripping for raw shell output.
//!
//! Devices with a line-editing layer (HP ProCurve / ArubaOS-Switch in
//! particular) paint their CLI with cursor positioning, erase and mode-set
//! sequences. A [`PatternSet`] is an ordered list of substitution rules; each
//! rule deletes every non-overlapping match before handing its output to the
//! next rule.
//!
//! The order is significant. The bare escape rule runs last so the
//! multi-character sequences are recognized first and nothing adjacent to
//! them is eaten by a partial match.
//!
//! Sequences split across two reads are cleaned independently, so a fragment
//! such as `;1H` at the start of the second chunk is still removed but a lone
//! `[` left at the end of the first chunk is not.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::{NoExpand, Regex};

use crate::error::ChannelError;

/// Cursor movement, erase, mode-set and parameter tail fragments.
const CONTROL_SEQUENCE: &str = r"(?-u)(\[\d*[HKJ])|(\[\?\d+[hl])|(\[\d+)|(;\d+\w?)";

/// Capital `E` left at a word boundary by ProCurve prompt repaints.
const PROMPT_ARTIFACT: &str = r"(?-u)E\b";

/// One or more raw escape bytes.
const ESCAPE: &str = r"(?-u)\x1B+";

/// Name of the capital `E` rule in [`PatternSet::standard`].
pub const PROMPT_ARTIFACT_RULE: &str = "prompt-artifact";

static STANDARD: LazyLock<PatternSet> = LazyLock::new(PatternSet::standard);

/// A single named substitution rule.
#[derive(Debug, Clone)]
pub struct SanitizeRule {
    name: String,
    pattern: Regex,
}

impl SanitizeRule {
    /// Compile a rule from a regex. Matches are replaced with nothing.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, ChannelError> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Rule name, used by [`PatternSet::without_rule`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// Ordered, immutable collection of sanitize rules.
#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<SanitizeRule>,
}

impl PatternSet {
    /// Build a set from rules, applied in the given order.
    pub fn new(rules: Vec<SanitizeRule>) -> Self {
        Self { rules }
    }

    /// The default rules: `control-sequence`, `prompt-artifact`, `escape`.
    pub fn standard() -> Self {
        let rule = |name: &str, pattern: &str| SanitizeRule {
            name: name.to_string(),
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("bad builtin rule {name}: {e}")),
        };

        Self::new(vec![
            rule("control-sequence", CONTROL_SEQUENCE),
            rule(PROMPT_ARTIFACT_RULE, PROMPT_ARTIFACT),
            rule("escape", ESCAPE),
        ])
    }

    /// The process-wide standard set, compiled on first use.
    pub fn shared() -> &'static PatternSet {
        &STANDARD
    }

    /// Append a rule after the existing ones.
    pub fn with_rule(mut self, rule: SanitizeRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Drop every rule with this name.
    pub fn without_rule(mut self, name: &str) -> Self {
        self.rules.retain(|r| r.name != name);
        self
    }

    /// The rules in application order.
    pub fn rules(&self) -> &[SanitizeRule] {
        &self.rules
    }

    /// Run every rule once, in order.
    ///
    /// Returns `Cow::Borrowed` when no rule matched.
    pub fn apply_once<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        let mut current = Cow::Borrowed(input);
        for rule in &self.rules {
            let replaced = match rule.pattern.replace_all(&current, NoExpand(b"")) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(bytes) => bytes,
            };
            current = Cow::Owned(replaced);
        }
        current
    }

    /// Strip control sequences from a raw chunk.
    ///
    /// Passes repeat until one leaves the text unchanged, so the result is a
    /// fixed point: sanitizing it again returns it as-is. Deleting a sequence
    /// can join its neighbours into a new match (`[[2KK` becomes `[K`).
    pub fn sanitize(&self, input: &[u8]) -> Vec<u8> {
        let mut output = match self.apply_once(input) {
            Cow::Borrowed(unchanged) => return unchanged.to_vec(),
            Cow::Owned(bytes) => bytes,
        };

        loop {
            let next = match self.apply_once(&output) {
                Cow::Owned(bytes) if bytes.len() < output.len() => bytes,
                _ => break,
            };
            output = next;
        }

        output
    }

    /// [`sanitize`](Self::sanitize) for already-decoded text.
    pub fn sanitize_str(&self, input: &str) -> String {
        String::from_utf8_lossy(&self.sanitize(input.as_bytes())).into_owned()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::shared().clone()
    }
}

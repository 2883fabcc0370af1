//! Fixed send-and-read sequence over a raw shell.
//!
//! No prompt detection: every step sends its text and reads exactly one
//! chunk, so long outputs arrive truncated to the reader's bound.

use log::debug;

use crate::channel::{InteractiveSession, ShellReader};
use crate::error::Result;

/// Cleaned output of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Text sent before reading, `None` for the banner read.
    pub sent: Option<String>,

    /// Sanitized chunk.
    pub text: String,

    /// The reader ran out of wait units before output showed up.
    pub timed_out: bool,
}

/// Banner read, a bare newline to get past "Press any key", then one
/// `\n<command>\n` per command.
#[derive(Debug, Clone)]
pub struct ShellScript {
    steps: Vec<Option<String>>,
}

impl ShellScript {
    /// Build the standard sequence for `commands`.
    pub fn new<I, C>(commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut steps = vec![None, Some("\n".to_string())];
        steps.extend(
            commands
                .into_iter()
                .map(|cmd| Some(format!("\n{}\n", cmd.as_ref()))),
        );
        Self { steps }
    }

    /// Text sent at each step, `None` where the step only reads.
    pub fn steps(&self) -> &[Option<String>] {
        &self.steps
    }

    /// Run every step in order, handing each cleaned chunk to `emit`.
    pub async fn run<S, F>(
        &self,
        session: &mut S,
        reader: &ShellReader,
        mut emit: F,
    ) -> Result<Vec<StepOutput>>
    where
        S: InteractiveSession,
        F: FnMut(&StepOutput),
    {
        let mut outputs = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            if let Some(text) = step {
                debug!("sending {:?}", text);
                session.send(text).await?;
            }

            let outcome = reader.read(session).await?;
            let cleaned = reader.patterns().sanitize(&outcome.chunk);
            let output = StepOutput {
                sent: step.clone(),
                text: String::from_utf8_lossy(&cleaned).into_owned(),
                timed_out: outcome.timed_out,
            };
            emit(&output);
            outputs.push(output);
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::channel::scripted::ScriptedSession;
    use crate::channel::{PatternSet, ReaderConfig};

    fn fast_reader() -> ShellReader {
        ShellReader::new(
            ReaderConfig {
                poll_interval: Duration::from_millis(1),
                ..Default::default()
            },
            PatternSet::standard(),
        )
    }

    #[test]
    fn test_step_framing() {
        let script = ShellScript::new(["show version", "show interfaces"]);
        assert_eq!(
            script.steps(),
            [
                None,
                Some("\n".to_string()),
                Some("\nshow version\n".to_string()),
                Some("\nshow interfaces\n".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_emits_each_chunk() {
        let mut session = ScriptedSession::new(b"\x1b[2J\x1b[1;1HPress any key to continue")
            .reply(b"\x1b[1;1HHP-2920# ")
            .reply(b"\r\nshow version\r\n Image stamp:    /ws/swbuildm\r\nHP-2920# ");

        let mut emitted = Vec::new();
        let outputs = ShellScript::new(["show version"])
            .run(&mut session, &fast_reader(), |out| emitted.push(out.text.clone()))
            .await
            .unwrap();

        assert_eq!(
            emitted,
            [
                "Press any key to continue",
                "HP-2920# ",
                "\r\nshow version\r\n Image stamp:    /ws/swbuildm\r\nHP-2920# ",
            ]
        );
        assert!(outputs.iter().all(|o| !o.timed_out));
        assert_eq!(session.sent, ["\n", "\nshow version\n"]);
    }

    #[tokio::test]
    async fn test_silent_device_times_out_per_step() {
        let mut session = ScriptedSession::silent();
        let outputs = ShellScript::new(Vec::<String>::new())
            .run(&mut session, &fast_reader(), |_| {})
            .await
            .unwrap();

        assert_eq!(outputs.len(), 2);
        assert!(outputs.iter().all(|o| o.timed_out && o.text.is_empty()));
        assert_eq!(session.reads, 2);
    }
}

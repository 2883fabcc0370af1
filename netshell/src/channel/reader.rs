//! Bounded polling reader for interactive sessions.

use std::time::Duration;

use log::{trace, warn};

use super::sanitizer::PatternSet;
use super::session::InteractiveSession;
use crate::error::Result;

/// Polling behavior for [`ShellReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Wait unit between readiness checks.
    pub poll_interval: Duration,

    /// Wait units before giving up and reading anyway.
    pub max_attempts: u32,

    /// Upper bound on bytes returned by one read.
    pub max_read: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_attempts: 10,
            max_read: 1024,
        }
    }
}

/// What one [`ShellReader::read`] call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// The raw chunk, possibly empty.
    pub chunk: Vec<u8>,

    /// Output never became ready within the wait budget.
    pub timed_out: bool,

    /// Wait units spent before reading.
    pub attempts: u32,
}

/// Reads one chunk at a time from a session and cleans it.
///
/// Never aggregates: callers that need a full response keep calling until
/// the prompt comes back.
#[derive(Debug, Clone, Default)]
pub struct ShellReader {
    config: ReaderConfig,
    patterns: PatternSet,
}

impl ShellReader {
    /// Create a reader with explicit polling config and rules.
    pub fn new(config: ReaderConfig, patterns: PatternSet) -> Self {
        Self { config, patterns }
    }

    /// Get the polling configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Get the sanitize rules.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Wait for output, then perform exactly one bounded read.
    ///
    /// Running out of wait units is not an error: it is logged, flagged on
    /// the outcome and the read still happens. Session failures propagate.
    pub async fn read<S: InteractiveSession>(&self, session: &mut S) -> Result<ReadOutcome> {
        let mut attempts = 0;
        let mut ready = session.output_ready().await?;

        while !ready && attempts < self.config.max_attempts {
            tokio::time::sleep(self.config.poll_interval).await;
            attempts += 1;
            if attempts < self.config.max_attempts {
                ready = session.output_ready().await?;
            }
        }

        let timed_out = !ready;
        if timed_out {
            warn!(
                "time out: no output after {} x {:?}",
                attempts, self.config.poll_interval
            );
        }

        let chunk = session.read_chunk(self.config.max_read).await?;
        trace!("read {} bytes after {} waits", chunk.len(), attempts);

        Ok(ReadOutcome {
            chunk,
            timed_out,
            attempts,
        })
    }

    /// [`read`](Self::read) followed by sanitizing the chunk.
    pub async fn read_clean<S: InteractiveSession>(&self, session: &mut S) -> Result<String> {
        let outcome = self.read(session).await?;
        Ok(String::from_utf8_lossy(&self.patterns.sanitize(&outcome.chunk)).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::scripted::ScriptedSession;
    use crate::error::{ChannelError, Error};

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
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.max_read, 1024);
    }

    #[tokio::test]
    async fn test_never_ready_times_out_then_reads_once() {
        let mut session = ScriptedSession::silent();
        let outcome = fast_reader().read(&mut session).await.unwrap();

        assert!(outcome.timed_out);
        assert_eq!(outcome.attempts, 10);
        assert!(outcome.chunk.is_empty());
        assert_eq!(session.ready_checks, 10);
        assert_eq!(session.reads, 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_reads_without_sleeping() {
        let reader = ShellReader::new(
            ReaderConfig {
                poll_interval: Duration::from_secs(3600),
                max_attempts: 0,
                ..Default::default()
            },
            PatternSet::standard(),
        );
        let mut session = ScriptedSession::silent();

        let outcome = tokio::time::timeout(Duration::from_secs(5), reader.read(&mut session))
            .await
            .expect("read slept a wait unit")
            .unwrap();

        assert!(outcome.timed_out);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(session.ready_checks, 1);
        assert_eq!(session.reads, 1);
    }

    #[tokio::test]
    async fn test_ready_immediately() {
        let mut session = ScriptedSession::new(b"Password: ");
        let outcome = fast_reader().read(&mut session).await.unwrap();

        assert!(!outcome.timed_out);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(outcome.chunk, b"Password: ");
        assert_eq!(session.reads, 1);
    }

    #[tokio::test]
    async fn test_ready_after_some_waits() {
        let mut session = ScriptedSession::new(b"switch# ");
        session.not_ready_for = 3;
        let outcome = fast_reader().read(&mut session).await.unwrap();

        assert!(!outcome.timed_out);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(session.ready_checks, 4);
        assert_eq!(outcome.chunk, b"switch# ");
    }

    #[tokio::test]
    async fn test_read_is_bounded() {
        let mut session = ScriptedSession::new(&[b'x'; 3000]);
        let reader = fast_reader();

        assert_eq!(reader.read(&mut session).await.unwrap().chunk.len(), 1024);
        assert_eq!(reader.read(&mut session).await.unwrap().chunk.len(), 1024);
        assert_eq!(reader.read(&mut session).await.unwrap().chunk.len(), 952);
    }

    #[tokio::test]
    async fn test_read_clean_strips_sequences() {
        let mut session = ScriptedSession::new(b"\x1b[2K\x1b[1;1HHello World\x1b[K");
        let text = fast_reader().read_clean(&mut session).await.unwrap();
        assert_eq!(text, "Hello World");
    }

    #[tokio::test]
    async fn test_closed_session_error_propagates() {
        let mut session = ScriptedSession::silent();
        session.closed = true;
        let err = fast_reader().read(&mut session).await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::Closed)));
        assert_eq!(session.ready_checks, 1);
    }
}

//! In-memory device double for unit tests.

use std::collections::VecDeque;

use super::session::InteractiveSession;
use crate::error::{ChannelError, Result};

/// Session that replays canned output.
///
/// `banner` is available immediately. Each `send` releases the next queued
/// reply. Reads drain whatever has been released, `max` bytes at a time.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSession {
    pending: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    pub(crate) sent: Vec<String>,
    pub(crate) ready_checks: u32,
    pub(crate) reads: u32,
    /// Number of ready checks that report "not ready" before data shows.
    pub(crate) not_ready_for: u32,
    pub(crate) closed: bool,
}

impl ScriptedSession {
    pub(crate) fn new(banner: &[u8]) -> Self {
        Self {
            pending: banner.to_vec(),
            ..Default::default()
        }
    }

    pub(crate) fn reply(mut self, output: &[u8]) -> Self {
        self.replies.push_back(output.to_vec());
        self
    }

    pub(crate) fn silent() -> Self {
        Self {
            not_ready_for: u32::MAX,
            ..Default::default()
        }
    }
}

impl InteractiveSession for ScriptedSession {
    async fn output_ready(&mut self) -> Result<bool> {
        self.ready_checks += 1;
        if self.closed {
            return Ok(true);
        }
        if self.ready_checks <= self.not_ready_for {
            return Ok(false);
        }
        Ok(!self.pending.is_empty())
    }

    async fn read_chunk(&mut self, max: usize) -> Result<Vec<u8>> {
        self.reads += 1;
        if self.pending.is_empty() && self.closed {
            return Err(ChannelError::Closed.into());
        }
        let n = max.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        self.sent.push(text.to_string());
        if let Some(reply) = self.replies.pop_front() {
            self.pending.extend_from_slice(&reply);
        }
        Ok(())
    }
}

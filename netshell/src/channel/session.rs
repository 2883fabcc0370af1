//! The interactive session contract consumed by the reader and driver.

use std::future::Future;

use crate::error::Result;

/// An open interactive shell on a remote device.
///
/// Implemented by [`SshShell`](crate::transport::SshShell) and by in-memory
/// doubles in tests. Authentication and transport setup happen before a
/// value of this type exists.
pub trait InteractiveSession: Send {
    /// Whether output can be read without waiting.
    ///
    /// A closed session reports ready so the following read surfaces the
    /// close instead of the caller polling a dead channel.
    fn output_ready(&mut self) -> impl Future<Output = Result<bool>> + Send;

    /// Read at most `max` bytes.
    ///
    /// May return an empty chunk when nothing arrived within the session's
    /// own read timeout.
    fn read_chunk(&mut self, max: usize) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Send text verbatim.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Send a newline-terminated command line.
    fn send_line(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send {
        async move {
            let mut framed = String::with_capacity(line.len() + 1);
            framed.push_str(line);
            framed.push('\n');
            self.send(&framed).await
        }
    }
}

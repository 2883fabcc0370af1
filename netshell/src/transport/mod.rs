//! SSH transport layer wrapping russh.
//!
//! Handles connection setup, authentication and host keys, and hands out
//! [`SshShell`] sessions for the channel layer.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig, default_key_paths};
pub use ssh::{ShellChannel, SshShell, SshTransport};

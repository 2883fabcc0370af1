//! Error types for netshell.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netshell operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Module parameter errors
    #[error("{0}")]
    Params(#[from] ParamError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not in known_hosts and verification is strict
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Requested connection kind has no transport in this crate
    #[error("{0} connections are not supported by this transport")]
    UnsupportedConnection(&'static str),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (shell reads, prompt matching).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed by the remote side
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (command execution, mode changes).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Command output matched a failure signature
    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Prompt did not match any mode of the platform
    #[error("Unknown mode from prompt: '{prompt}'")]
    UnknownMode { prompt: String },

    /// Device landed in a different mode than requested
    #[error("Failed to acquire mode '{target}'")]
    ModeAcquisitionFailed { target: String },

    /// No path found between modes
    #[error("No path from mode '{from}' to '{to}'")]
    NoModePath { from: String, to: String },

    /// Device asked for a password but none was configured
    #[error("Mode '{mode}' requires a secret but none was given")]
    SecretRequired { mode: String },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },

    /// Platform name not found in the registry
    #[error("Unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// Platform name registered twice
    #[error("Platform '{name}' is already registered")]
    AlreadyRegistered { name: String },
}

/// Automation-module parameter errors.
///
/// Display strings are what the module reports as `msg`.
#[derive(Error, Debug)]
pub enum ParamError {
    /// A mandatory parameter was absent locally and in the provider
    #[error("{name} is required")]
    Missing { name: &'static str },

    /// Both `commands` and `commands_file` were given
    #[error("commands and commands_file are mutually exclusive")]
    ConflictingCommands,

    /// Telnet was requested for a platform other than `cisco_ios`
    #[error("only cisco_ios supports telnet connection")]
    TelnetUnsupported { platform: String },

    /// The commands file does not exist or cannot be read
    #[error("Unable to locate: {}", path.display())]
    CommandsFileNotFound { path: PathBuf },

    /// Port was not a valid TCP port
    #[error("invalid port '{value}'")]
    InvalidPort { value: String },

    /// Parameter document was not valid JSON for this module
    #[error("invalid parameters: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// Output matched a platform error signature
    #[error("Error executing command: {output}")]
    DeviceError { output: String },
}

/// Result type alias using netshell's Error.
pub type Result<T> = std::result::Result<T, Error>;

//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Learn unknown keys, reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For lab use only.
    Disabled,
}

/// SSH connection configuration.
#[derive(Debug)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Connect timeout, also the inactivity timeout of the session.
    pub timeout: Duration,

    /// How long a single shell read waits before returning empty.
    pub read_timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file, `~/.ssh/known_hosts` when unset.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Config with defaults for everything but the endpoint and credentials.
    pub fn new(host: impl Into<String>, username: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            auth,
            timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(1),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// `host:port`, for logging.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication method for SSH connections.
#[derive(Debug)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },

    /// Try the unencrypted identities in `~/.ssh`, see [`default_key_paths`].
    DefaultKeys,
}

/// Identity files tried by [`AuthMethod::DefaultKeys`], in order.
///
/// Empty when `HOME` is unset.
pub fn default_key_paths() -> Vec<PathBuf> {
    let Some(home) = std::env::var_os("HOME") else {
        return Vec::new();
    };
    let ssh_dir = PathBuf::from(home).join(".ssh");
    ["id_ed25519", "id_ecdsa", "id_rsa"]
        .iter()
        .map(|name| ssh_dir.join(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SshConfig::new("172.16.1.82", "manager", AuthMethod::None);
        assert_eq!(config.port, 22);
        assert_eq!(config.socket_addr(), "172.16.1.82:22");
        assert_eq!(config.host_key_verification, HostKeyVerification::AcceptNew);
    }

    #[test]
    fn test_default_key_paths_order() {
        let names: Vec<_> = default_key_paths()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        if !names.is_empty() {
            assert_eq!(names, ["id_ed25519", "id_ecdsa", "id_rsa"]);
        }
    }

    #[test]
    fn test_password_is_redacted() {
        let auth = AuthMethod::Password(SecretString::from("manager"));
        assert!(!format!("{auth:?}").contains("manager"));
    }
}

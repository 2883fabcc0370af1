//! Builder for creating device drivers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::generic::GenericDriver;
use crate::error::{DriverError, Result};
use crate::platform::{PlatformDefinition, PlatformRegistry};
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for constructing device drivers.
///
/// # Example
///
/// ```rust,no_run
/// use netshell::driver::{Driver, DriverBuilder};
///
/// # async fn example() -> Result<(), netshell::Error> {
/// let mut driver = DriverBuilder::new("192.168.1.1")
///     .username("manager")
///     .password("secret")
///     .platform("hp_procurve")
///     .build()?;
/// driver.open().await?;
/// let response = driver.send_command("show version").await?;
/// println!("{}", response.result);
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    secret: Option<SecretString>,
    platform_name: Option<String>,
    custom_platform: Option<PlatformDefinition>,
    registry: Option<PlatformRegistry>,
    timeout: Duration,
    read_timeout: Duration,
    terminal_size: Option<(u32, u32)>,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            secret: None,
            platform_name: None,
            custom_platform: None,
            registry: None,
            timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(1),
            terminal_size: None,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set any authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the enable secret.
    pub fn secret(mut self, secret: SecretString) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Set the platform name (e.g., "hp_procurve", "cisco_ios").
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform_name = Some(platform.into());
        self
    }

    /// Look platform names up in this registry instead of the built-ins.
    pub fn registry(mut self, registry: PlatformRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set a custom platform definition.
    pub fn custom_platform(mut self, platform: PlatformDefinition) -> Self {
        self.custom_platform = Some(platform);
        self
    }

    /// Set the connection and prompt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how long one shell read waits for data.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set terminal dimensions, overriding the platform's.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_size = Some((width, height));
        self
    }

    /// Set host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a known_hosts file other than `~/.ssh/known_hosts`.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Build the driver.
    ///
    /// This creates the driver but does not connect. Call `open()` on the
    /// returned driver to establish the connection.
    pub fn build(self) -> Result<GenericDriver> {
        let username = self.username.ok_or_else(|| DriverError::InvalidConfig {
            message: "username is required".to_string(),
        })?;

        let platform = match (self.custom_platform, self.platform_name) {
            (Some(custom), _) => {
                custom.validate()?;
                custom
            }
            (None, Some(name)) => {
                let registry = self.registry.unwrap_or_else(PlatformRegistry::with_builtins);
                registry.require(&name)?.clone()
            }
            (None, None) => {
                return Err(DriverError::InvalidConfig {
                    message: "platform must be specified".to_string(),
                }
                .into());
            }
        };

        let (terminal_width, terminal_height) = self
            .terminal_size
            .unwrap_or((platform.terminal_width, platform.terminal_height));

        let mut ssh_config = SshConfig::new(self.host, username, self.auth);
        ssh_config.port = self.port;
        ssh_config.timeout = self.timeout;
        ssh_config.read_timeout = self.read_timeout;
        ssh_config.terminal_width = terminal_width;
        ssh_config.terminal_height = terminal_height;
        ssh_config.host_key_verification = self.host_key_verification;
        ssh_config.known_hosts_path = self.known_hosts_path;

        Ok(GenericDriver::new(ssh_config, platform, self.secret))
    }
}

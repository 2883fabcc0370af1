//! Generic driver implementation that works with any platform.

use log::debug;
use secrecy::SecretString;

use super::Driver;
use super::cli::CliSession;
use super::response::Response;
use crate::error::{DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::{SshConfig, SshShell, SshTransport};

/// Driver for any platform definition over SSH.
///
/// Owns the transport and the prompt-driven session on top of it. Built by
/// [`DriverBuilder`](super::DriverBuilder); nothing connects until
/// [`open`](Driver::open).
pub struct GenericDriver {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    secret: Option<SecretString>,
    transport: Option<SshTransport>,
    cli: Option<CliSession<SshShell>>,
    banner: Option<String>,
}

impl GenericDriver {
    /// Create a driver. `secret` answers enable-style password prompts.
    pub fn new(
        ssh_config: SshConfig,
        platform: PlatformDefinition,
        secret: Option<SecretString>,
    ) -> Self {
        Self {
            ssh_config,
            platform,
            secret,
            transport: None,
            cli: None,
            banner: None,
        }
    }

    /// Get a reference to the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Get the SSH configuration.
    pub fn ssh_config(&self) -> &SshConfig {
        &self.ssh_config
    }

    /// Login banner read while opening, prompt included.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }
}

impl Driver for GenericDriver {
    async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = SshTransport::connect(&self.ssh_config).await?;
        let shell = transport.open_shell().await?;
        let mut cli = CliSession::new(shell, self.platform.clone(), self.ssh_config.timeout)?;

        self.banner = Some(cli.open().await?);
        debug!(
            "{} open on {} in mode {:?}",
            self.platform.name,
            self.ssh_config.socket_addr(),
            cli.current_mode()
        );

        self.transport = Some(transport);
        self.cli = Some(cli);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(cli) = self.cli.take() {
            cli.into_inner().close().await?;
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let cli = self.cli.as_mut().ok_or(DriverError::NotConnected)?;
        cli.send_command(command).await
    }

    async fn send_config_set(&mut self, commands: &[String]) -> Result<Vec<Response>> {
        let cli = self.cli.as_mut().ok_or(DriverError::NotConnected)?;
        cli.send_config_set(commands, self.secret.as_ref()).await
    }

    async fn enable(&mut self) -> Result<()> {
        let cli = self.cli.as_mut().ok_or(DriverError::NotConnected)?;
        cli.enable(self.secret.as_ref()).await
    }

    fn is_open(&self) -> bool {
        self.cli.is_some()
    }

    fn is_alive(&self) -> bool {
        self.transport.as_ref().is_some_and(SshTransport::is_alive)
    }

    fn current_mode(&self) -> Option<&str> {
        self.cli.as_ref().and_then(CliSession::current_mode)
    }
}

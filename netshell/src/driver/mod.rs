//! High-level driver for device interaction.
//!
//! The driver layer provides the main API for sending commands, entering
//! privileged mode and sending configuration sets on network devices.

mod builder;
mod cli;
mod generic;
mod modes;
pub(crate) mod response;

pub use builder::DriverBuilder;
pub use cli::CliSession;
pub use generic::GenericDriver;
pub use modes::{ModeStep, ModeTracker};
pub use response::{Response, transcript};

use std::future::Future;

use crate::error::Result;

/// Trait for device drivers.
pub trait Driver: Send {
    /// Open the connection to the device.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the connection.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send multiple commands sequentially.
    fn send_commands(
        &mut self,
        commands: &[String],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send {
        async move {
            let mut responses = Vec::with_capacity(commands.len());
            for cmd in commands {
                responses.push(self.send_command(cmd).await?);
            }
            Ok(responses)
        }
    }

    /// Send commands in configuration mode.
    ///
    /// Enters the platform's configuration mode, sends every command and
    /// returns to the mode the device was in.
    ///
    /// ```rust,no_run
    /// use netshell::driver::Driver;
    ///
    /// # async fn example(driver: &mut impl Driver) -> Result<(), netshell::Error> {
    /// let responses = driver
    ///     .send_config_set(&["vlan 10".into(), "name vlan_10".into()])
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    fn send_config_set(
        &mut self,
        commands: &[String],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send;

    /// Enter privileged mode, answering a password prompt with the secret.
    fn enable(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Check if the driver is connected.
    fn is_open(&self) -> bool;

    /// Check if the underlying SSH session is still alive.
    fn is_alive(&self) -> bool;

    /// Get the current mode name.
    fn current_mode(&self) -> Option<&str>;
}

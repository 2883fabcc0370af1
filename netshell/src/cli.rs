//! Command-line arguments for the netshell binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use secrecy::SecretString;

use netshell::error::ParamError;
use netshell::params::load_commands;
use netshell::transport::{AuthMethod, HostKeyVerification, SshConfig};

/// Interactive shell scraping for switches and routers.
#[derive(Parser, Debug)]
#[command(name = "netshell", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send each command on a raw shell and print one cleaned chunk per step
    Shell(ConnectArgs),

    /// Run commands until the prompt returns and print normalized output
    Command {
        #[command(flatten)]
        connect: ConnectArgs,

        /// Enter privileged mode first, answering with --secret
        #[arg(long)]
        enable: bool,

        /// Send the commands as a configuration set
        #[arg(long)]
        config: bool,
    },

    /// Push a configuration set described by a JSON parameter document
    Module {
        /// Parameter document
        #[arg(long, value_name = "FILE")]
        args: PathBuf,

        /// Connect and prompt timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

/// Host key checking, named like OpenSSH's StrictHostKeyChecking values.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HostKeyChecking {
    Yes,
    #[default]
    AcceptNew,
    No,
}

impl From<HostKeyChecking> for HostKeyVerification {
    fn from(value: HostKeyChecking) -> Self {
        match value {
            HostKeyChecking::Yes => HostKeyVerification::Strict,
            HostKeyChecking::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyChecking::No => HostKeyVerification::Disabled,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Device hostname or IP
    #[arg(long)]
    pub host: String,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    pub port: u16,

    /// Login user
    #[arg(short, long)]
    pub username: String,

    /// Login password
    #[arg(short, long, env = "NETSHELL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Private key used instead of the password
    #[arg(long, value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    /// Privileged mode password
    #[arg(long, env = "NETSHELL_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Platform name, e.g. hp_procurve, cisco_ios, linux
    #[arg(long, default_value = "hp_procurve")]
    pub platform: String,

    /// Connect and prompt timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Host key checking
    #[arg(long, value_enum, default_value_t)]
    pub host_key_checking: HostKeyChecking,

    /// Command to send; repeat for several
    #[arg(short, long = "command", value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// File with one command per line
    #[arg(long, value_name = "FILE", conflicts_with = "commands")]
    pub commands_file: Option<PathBuf>,
}

impl ConnectArgs {
    /// Key file when given, else password, else no authentication.
    pub fn auth(&self) -> AuthMethod {
        match (&self.key_file, &self.password) {
            (Some(path), _) => AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: None,
            },
            (None, Some(password)) => AuthMethod::Password(SecretString::from(password.clone())),
            (None, None) => AuthMethod::None,
        }
    }

    pub fn secret(&self) -> Option<SecretString> {
        self.secret.clone().map(SecretString::from)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Commands from the flags or the file, `fallback` when neither is given.
    pub fn commands_or(&self, fallback: &[&str]) -> Result<Vec<String>, ParamError> {
        if let Some(path) = &self.commands_file {
            return load_commands(path);
        }
        if self.commands.is_empty() {
            return Ok(fallback.iter().map(|c| c.to_string()).collect());
        }
        Ok(self.commands.clone())
    }

    pub fn ssh_config(&self) -> SshConfig {
        let mut config = SshConfig::new(&self.host, &self.username, self.auth());
        config.port = self.port;
        config.timeout = self.timeout();
        config.host_key_verification = self.host_key_checking.into();
        config
    }
}

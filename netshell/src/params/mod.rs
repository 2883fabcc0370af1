//! Automation-module parameters.
//!
//! A parameter document carries connection settings either at top level or
//! inside a `provider` dictionary, with the same keys. Top-level values win
//! when present; the provider fills the gaps. Resolution validates
//! everything before any network activity and produces one immutable
//! [`ResolvedParams`].

mod result;

pub use result::ModuleResult;

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ParamError;
use crate::transport::AuthMethod;

/// The only platform with a telnet device type.
const TELNET_PLATFORM: &str = "cisco_ios";

/// How the module reaches the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Ssh,
    Telnet,
}

impl ConnectionKind {
    /// Port used when the document names none.
    pub fn default_port(self) -> u16 {
        match self {
            Self::Ssh => 22,
            Self::Telnet => 23,
        }
    }
}

/// Ports arrive as numbers or as strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortParam {
    Number(u64),
    Text(String),
}

impl PortParam {
    fn to_port(&self) -> Result<Option<u16>, ParamError> {
        let invalid = || ParamError::InvalidPort {
            value: match self {
                Self::Number(n) => n.to_string(),
                Self::Text(s) => s.clone(),
            },
        };
        match self {
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Number(n) => u16::try_from(*n)
                .ok()
                .filter(|p| *p != 0)
                .map(Some)
                .ok_or_else(invalid),
            Self::Text(s) => s
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .map(Some)
                .ok_or_else(invalid),
        }
    }
}

/// One set of parameter values: the top level or the provider.
///
/// Absent, `null` and empty-string values all count as unset.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParamLayer {
    pub connection: Option<ConnectionKind>,
    pub platform: Option<String>,
    pub commands: Option<Vec<String>>,
    pub commands_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<PortParam>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub secret: Option<String>,
    pub use_keys: Option<bool>,
    pub key_file: Option<PathBuf>,
}

impl ParamLayer {
    /// Fill every unset value of `self` from `fallback`.
    pub fn or(self, fallback: ParamLayer) -> ParamLayer {
        ParamLayer {
            connection: self.connection.or(fallback.connection),
            platform: present(self.platform).or(present(fallback.platform)),
            commands: non_empty(self.commands).or(non_empty(fallback.commands)),
            commands_file: present_path(self.commands_file).or(present_path(fallback.commands_file)),
            host: present(self.host).or(present(fallback.host)),
            port: self.port.or(fallback.port),
            username: present(self.username).or(present(fallback.username)),
            password: present(self.password).or(present(fallback.password)),
            secret: present(self.secret).or(present(fallback.secret)),
            use_keys: self.use_keys.or(fallback.use_keys),
            key_file: present_path(self.key_file).or(present_path(fallback.key_file)),
        }
    }
}

impl fmt::Debug for ParamLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ParamLayer")
            .field("connection", &self.connection)
            .field("platform", &self.platform)
            .field("commands", &self.commands)
            .field("commands_file", &self.commands_file)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("secret", &redact(&self.secret))
            .field("use_keys", &self.use_keys)
            .field("key_file", &self.key_file)
            .finish()
    }
}

/// The full parameter document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleParams {
    #[serde(flatten)]
    pub local: ParamLayer,

    #[serde(default)]
    pub provider: Option<ParamLayer>,
}

impl ModuleParams {
    /// Parse a JSON parameter document.
    pub fn from_json(document: &str) -> Result<Self, ParamError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Merge, validate and load commands.
    ///
    /// Checks run in a fixed order so the first problem reported is
    /// predictable: required `host`, `username`, `platform`, `password`;
    /// commands versus commands file; telnet platform; port. The commands
    /// file is read last.
    pub fn resolve(self) -> Result<ResolvedParams, ParamError> {
        let merged = match self.provider {
            Some(provider) => self.local.or(provider),
            None => self.local.or(ParamLayer::default()),
        };
        debug!("merged parameters: {:?}", merged);

        let host = merged.host.ok_or(ParamError::Missing { name: "host" })?;
        let username = merged.username.ok_or(ParamError::Missing { name: "username" })?;
        let platform = merged.platform.ok_or(ParamError::Missing { name: "platform" })?;
        let password = merged.password.ok_or(ParamError::Missing { name: "password" })?;

        let source = match (merged.commands, merged.commands_file) {
            (Some(_), Some(_)) => return Err(ParamError::ConflictingCommands),
            (Some(commands), None) => CommandSource::Inline(commands),
            (None, Some(path)) => CommandSource::File(path),
            (None, None) => return Err(ParamError::Missing { name: "commands" }),
        };

        let connection = merged.connection.unwrap_or_default();
        let mut device_type = platform.split('-').next().unwrap_or(&platform).to_string();
        if connection == ConnectionKind::Telnet {
            if platform != TELNET_PLATFORM {
                return Err(ParamError::TelnetUnsupported { platform });
            }
            device_type = format!("{TELNET_PLATFORM}_telnet");
        }

        let port = match &merged.port {
            Some(port) => port.to_port()?,
            None => None,
        }
        .unwrap_or(connection.default_port());

        let use_keys = merged.use_keys.unwrap_or(false);
        let key_file = merged.key_file;

        let commands = match source {
            CommandSource::Inline(commands) => commands,
            CommandSource::File(path) => load_commands(&path)?,
        };

        Ok(ResolvedParams {
            connection,
            host,
            port,
            username,
            password: SecretString::from(password),
            secret: merged.secret.map(SecretString::from),
            platform,
            device_type,
            commands,
            use_keys,
            key_file,
        })
    }
}

enum CommandSource {
    Inline(Vec<String>),
    File(PathBuf),
}

/// Validated module configuration.
#[derive(Debug)]
pub struct ResolvedParams {
    pub connection: ConnectionKind,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub secret: Option<SecretString>,

    /// Platform as given, e.g. `hp_procurve-2920`.
    pub platform: String,

    /// Platform up to the first `-`, `_telnet` appended for telnet.
    pub device_type: String,

    pub commands: Vec<String>,
    pub use_keys: bool,
    pub key_file: Option<PathBuf>,
}

impl ResolvedParams {
    /// Login method: with `use_keys`, the key file or else the default
    /// `~/.ssh` identities; otherwise the password.
    pub fn auth_method(&self) -> AuthMethod {
        match (&self.key_file, self.use_keys) {
            (Some(path), true) => AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: None,
            },
            (None, true) => AuthMethod::DefaultKeys,
            _ => AuthMethod::Password(SecretString::from(
                self.password.expose_secret().to_owned(),
            )),
        }
    }

    /// Registry name of the platform, without the telnet suffix.
    pub fn platform_name(&self) -> &str {
        self.device_type
            .strip_suffix("_telnet")
            .unwrap_or(&self.device_type)
    }
}

/// One command per non-blank line, trailing whitespace dropped.
pub fn load_commands(path: &Path) -> Result<Vec<String>, ParamError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        debug!("reading {}: {}", path.display(), e);
        ParamError::CommandsFileNotFound {
            path: path.to_path_buf(),
        }
    })?;

    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn present_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}

fn non_empty(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value.filter(|v| !v.is_empty())
}

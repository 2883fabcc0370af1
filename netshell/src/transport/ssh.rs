//! SSH transport implementation using russh.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use log::{debug, trace, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKey, PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;
use tokio::time::{Duration, Instant, timeout, timeout_at};

use super::config::{AuthMethod, HostKeyVerification, SshConfig, default_key_paths};
use crate::channel::InteractiveSession;
use crate::error::{ChannelError, Result, TransportError};

/// An authenticated SSH connection.
pub struct SshTransport {
    session: Handle<SshHandler>,
    terminal_width: u32,
    terminal_height: u32,
    read_timeout: Duration,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification,
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        debug!("connecting to {}", config.socket_addr());

        let mut session = timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            // Prefer the detailed host-key error over russh's generic one
            match host_key_error.lock().ok().and_then(|mut slot| slot.take()) {
                Some(hk_err) => hk_err,
                None => TransportError::Ssh(e),
            }
        })?;

        Self::authenticate(&mut session, config).await?;
        debug!("authenticated as '{}'", config.username);

        Ok(Self {
            session,
            terminal_width: config.terminal_width,
            terminal_height: config.terminal_height,
            read_timeout: config.read_timeout,
        })
    }

    /// Open a PTY channel and start an interactive shell on it.
    pub async fn open_shell(&self) -> Result<SshShell> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "xterm",
                self.terminal_width,
                self.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        Ok(SshShell::new(channel, self.read_timeout))
    }

    async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
        let success = match &config.auth {
            AuthMethod::None => session
                .authenticate_none(&config.username)
                .await
                .map_err(TransportError::Ssh)?
                .success(),
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(TransportError::Ssh)?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| TransportError::Key(e.to_string()))?;
                Self::authenticate_key(session, &config.username, key).await?
            }
            AuthMethod::DefaultKeys => {
                let mut accepted = false;
                for path in default_key_paths().into_iter().filter(|p| p.exists()) {
                    let key = match load_secret_key(&path, None) {
                        Ok(key) => key,
                        Err(e) => {
                            debug!("skipping key {}: {}", path.display(), e);
                            continue;
                        }
                    };
                    if Self::authenticate_key(session, &config.username, key).await? {
                        debug!("accepted key {}", path.display());
                        accepted = true;
                        break;
                    }
                }
                accepted
            }
        };

        if !success {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(())
    }

    async fn authenticate_key(
        session: &mut Handle<SshHandler>,
        username: &str,
        key: PrivateKey,
    ) -> Result<bool> {
        let hash_alg = session
            .best_supported_rsa_hash()
            .await
            .map_err(TransportError::Ssh)?
            .flatten();

        let auth = session
            .authenticate_publickey(username, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
            .await
            .map_err(TransportError::Ssh)?;
        Ok(auth.success())
    }

    /// Check if the connection's background task is still running.
    pub fn is_alive(&self) -> bool {
        !self.session.is_closed()
    }

    /// Disconnect.
    pub async fn close(self) -> Result<()> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// The message side of an SSH channel that an [`SshShell`] reads from and
/// writes to.
pub trait ShellChannel: Send {
    /// Wait for the next channel message, `None` once the channel is gone.
    fn wait(&mut self) -> impl Future<Output = Option<ChannelMsg>> + Send;

    /// Write bytes to the remote shell.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

impl ShellChannel for Channel<Msg> {
    async fn wait(&mut self) -> Option<ChannelMsg> {
        Channel::wait(self).await
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.data(data).await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}

/// Interactive shell on an SSH PTY channel.
///
/// Channel messages are drained into a pending buffer, which backs the
/// readiness check and bounded reads.
pub struct SshShell<C = Channel<Msg>> {
    channel: C,
    pending: BytesMut,
    closed: bool,
    read_timeout: Duration,
}

impl<C: ShellChannel> SshShell<C> {
    fn new(channel: C, read_timeout: Duration) -> Self {
        Self {
            channel,
            pending: BytesMut::with_capacity(4096),
            closed: false,
            read_timeout,
        }
    }

    fn has_output(&self) -> bool {
        !self.pending.is_empty() || self.closed
    }

    fn absorb(&mut self, msg: Option<ChannelMsg>) {
        match msg {
            Some(ChannelMsg::Data { data }) => self.pending.extend_from_slice(&data),
            Some(ChannelMsg::ExtendedData { data, .. }) => self.pending.extend_from_slice(&data),
            Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                debug!("shell channel closed by peer");
                self.closed = true;
            }
            Some(other) => trace!("ignoring channel message {:?}", other),
        }
    }
}

impl SshShell<Channel<Msg>> {
    /// Close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}

impl<C: ShellChannel> InteractiveSession for SshShell<C> {
    async fn output_ready(&mut self) -> Result<bool> {
        // Zero timeout: only take messages that are already queued. Control
        // replies (pty/shell success, window adjusts) can sit ahead of data.
        while !self.has_output() {
            match timeout(Duration::ZERO, self.channel.wait()).await {
                Ok(msg) => self.absorb(msg),
                Err(_) => break,
            }
        }
        Ok(self.has_output())
    }

    async fn read_chunk(&mut self, max: usize) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.read_timeout;
        while self.pending.is_empty() && !self.closed {
            match timeout_at(deadline, self.channel.wait()).await {
                Ok(msg) => self.absorb(msg),
                Err(_) => break,
            }
        }

        if self.pending.is_empty() {
            if self.closed {
                return Err(ChannelError::Closed.into());
            }
            return Ok(Vec::new());
        }

        let n = max.min(self.pending.len());
        Ok(self.pending.split_to(n).to_vec())
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        self.channel.write(text.as_bytes()).await
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Detailed host-key error for connect() to surface.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// `Ok(true)` if matched, `Ok(false)` if the host is not listed.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, TransportError> {
        let result = match &self.known_hosts_path {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    fn learn_host_key(&self, pubkey: &PublicKey) -> std::result::Result<(), TransportError> {
        let result = match &self.known_hosts_path {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey),
        };

        result.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    fn reject(&self, err: TransportError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(err);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let accepted = match self.host_key_verification {
            HostKeyVerification::Disabled => true,

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key: {}", e);
                    }
                    true
                }
                Err(e) => self.reject(e),
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => self.reject(TransportError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                }),
                Err(e) => self.reject(e),
            },
        };

        Ok(accepted)
    }
}

//! Prompt-driven command exchange over any interactive session.

use std::time::{Duration, Instant};

use log::{debug, trace};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::modes::ModeTracker;
use super::response::Response;
use crate::channel::{InteractiveSession, PatternBuffer};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;

/// Pause before polling again after an empty read.
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Tail bytes searched for a prompt.
const SEARCH_DEPTH: usize = 1000;

/// Bytes requested per read while waiting for a prompt.
const READ_SIZE: usize = 4096;

/// Sends commands and reads until the device prompt returns.
///
/// Generic over the session so the same logic drives SSH shells and test
/// doubles.
pub struct CliSession<S> {
    session: S,
    platform: PlatformDefinition,
    buffer: PatternBuffer,
    modes: ModeTracker,
    prompt_pattern: Regex,
    timeout: Duration,
}

impl<S: InteractiveSession> CliSession<S> {
    /// Wrap an open session. Nothing is read until [`open`](Self::open).
    pub fn new(session: S, platform: PlatformDefinition, timeout: Duration) -> Result<Self> {
        let prompt_pattern = platform.prompt_pattern().map_err(ChannelError::from)?;
        let buffer = PatternBuffer::with_patterns(SEARCH_DEPTH, platform.patterns.clone());
        Ok(Self {
            session,
            modes: ModeTracker::new(platform.modes.clone()),
            platform,
            buffer,
            prompt_pattern,
            timeout,
        })
    }

    /// Wait for the first prompt, dismissing a "press any key" banner, then
    /// run the platform's on_open commands.
    ///
    /// Returns the login banner.
    pub async fn open(&mut self) -> Result<String> {
        let banner = match self.platform.continue_prompt.clone() {
            Some(text) => {
                let either = Regex::new(&format!(
                    "(?:{})|(?:{})",
                    regex::escape(&text),
                    self.prompt_pattern.as_str()
                ))
                .map_err(ChannelError::from)?;
                let data = self.read_until(&either).await?;
                let mut banner = String::from_utf8_lossy(&data).into_owned();
                if banner.contains(&text) {
                    debug!("dismissing '{}' banner", text);
                    self.session.send("\n").await?;
                    let rest = self.read_until_prompt().await?;
                    banner.push_str(&String::from_utf8_lossy(&rest));
                }
                banner
            }
            None => {
                let data = self.read_until_prompt().await?;
                String::from_utf8_lossy(&data).into_owned()
            }
        };

        if let Some(mode) = self.modes.observe(last_line(&banner)) {
            debug!("initial mode: {}", mode);
        }

        for command in self.platform.on_open_commands.clone() {
            self.send_command(&command).await?;
        }

        Ok(banner)
    }

    /// Read until `pattern` matches the tail of the cleaned output.
    pub async fn read_until(&mut self, pattern: &Regex) -> Result<Vec<u8>> {
        self.buffer.clear();
        let deadline = tokio::time::Instant::now() + self.timeout;

        loop {
            if self.buffer.tail_contains(pattern) {
                return Ok(self.buffer.take());
            }

            let chunk = tokio::time::timeout_at(deadline, self.session.read_chunk(READ_SIZE))
                .await
                .map_err(|_| ChannelError::PatternTimeout(self.timeout))??;

            if chunk.is_empty() {
                if tokio::time::Instant::now() >= deadline {
                    return Err(ChannelError::PatternTimeout(self.timeout).into());
                }
                tokio::time::sleep(IDLE_BACKOFF).await;
                continue;
            }

            trace!("received {} bytes", chunk.len());
            self.buffer.extend(&chunk);
        }
    }

    /// Read until any mode's prompt shows up.
    pub async fn read_until_prompt(&mut self) -> Result<Vec<u8>> {
        let pattern = self.prompt_pattern.clone();
        self.read_until(&pattern).await
    }

    /// Send one command and collect its output.
    ///
    /// Output matching an error signature yields a failed [`Response`],
    /// not an `Err`.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();
        debug!("sending command: {:?}", command);

        self.session.send_line(command).await?;
        let data = self.read_until_prompt().await?;

        let raw = String::from_utf8_lossy(&data).into_owned();
        let prompt = last_line(&raw).trim().to_string();
        self.modes.observe(&prompt);

        let response = Response::from_raw(command, raw, prompt, start.elapsed());
        match self.platform.detect_failure(&response.result).map(str::to_string) {
            Some(signature) => {
                debug!("failure signature {:?} in output of {:?}", signature, command);
                Ok(response.with_failure(signature))
            }
            None => Ok(response),
        }
    }

    /// Send commands one after another, stopping at the first I/O error.
    pub async fn send_commands(&mut self, commands: &[String]) -> Result<Vec<Response>> {
        let mut responses = Vec::with_capacity(commands.len());
        for command in commands {
            responses.push(self.send_command(command).await?);
        }
        Ok(responses)
    }

    /// Move to the named mode, answering password prompts with `secret`.
    pub async fn acquire_mode(&mut self, target: &str, secret: Option<&SecretString>) -> Result<()> {
        let current = self
            .modes
            .current_name()
            .ok_or_else(|| DriverError::UnknownMode {
                prompt: String::from_utf8_lossy(self.buffer.as_slice()).into_owned(),
            })?
            .to_string();

        for step in self.modes.plan(&current, target)? {
            debug!("mode change -> {} via {:?}", step.to, step.command);
            self.session.send_line(&step.command).await?;

            let secret_prompt = if step.entering {
                self.modes.get(&step.to).and_then(|m| m.secret_prompt.clone())
            } else {
                None
            };

            let data = match secret_prompt {
                Some(secret_prompt) => {
                    let either = Regex::new(&format!(
                        "(?:{})|(?:{})",
                        secret_prompt.as_str(),
                        self.prompt_pattern.as_str()
                    ))
                    .map_err(ChannelError::from)?;
                    let data = self.read_until(&either).await?;
                    if secret_prompt.is_match(last_line_bytes(&data)) {
                        let secret = secret.ok_or_else(|| DriverError::SecretRequired {
                            mode: step.to.clone(),
                        })?;
                        self.session.send_line(secret.expose_secret()).await?;
                        self.read_until_prompt().await?
                    } else {
                        data
                    }
                }
                None => self.read_until_prompt().await?,
            };

            let prompt = String::from_utf8_lossy(last_line_bytes(&data)).into_owned();
            let reached = self.modes.observe(&prompt).map(str::to_string);
            if reached.as_deref() != Some(step.to.as_str()) {
                return Err(DriverError::ModeAcquisitionFailed { target: step.to }.into());
            }
        }

        Ok(())
    }

    /// Enter the platform's privileged mode.
    pub async fn enable(&mut self, secret: Option<&SecretString>) -> Result<()> {
        match self.platform.privileged_mode.clone() {
            Some(mode) => self.acquire_mode(&mode, secret).await,
            None => Ok(()),
        }
    }

    /// Send a configuration command set.
    ///
    /// Enters the configuration mode, sends each command and returns to the
    /// mode the session started in. Platforms without a configuration mode
    /// run the commands where they are.
    pub async fn send_config_set(
        &mut self,
        commands: &[String],
        secret: Option<&SecretString>,
    ) -> Result<Vec<Response>> {
        let Some(config_mode) = self.platform.config_mode.clone() else {
            return self.send_commands(commands).await;
        };

        let start_mode = self.modes.current_name().map(str::to_string);
        self.acquire_mode(&config_mode, secret).await?;

        let responses = self.send_commands(commands).await?;

        // Commands like "end" inside the set may already have left config
        if let Some(start_mode) = start_mode {
            if self.modes.current_name() != Some(start_mode.as_str()) {
                self.acquire_mode(&start_mode, secret).await?;
            }
        }

        Ok(responses)
    }

    /// Get the current mode name.
    pub fn current_mode(&self) -> Option<&str> {
        self.modes.current_name()
    }

    /// Get a mutable reference to the underlying session.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Give back the underlying session.
    pub fn into_inner(self) -> S {
        self.session
    }
}

fn last_line(text: &str) -> &str {
    text.rsplit('\n').next().unwrap_or(text)
}

fn last_line_bytes(data: &[u8]) -> &[u8] {
    match memchr::memrchr(b'\n', data) {
        Some(pos) => &data[pos + 1..],
        None => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::scripted::ScriptedSession;
    use crate::error::Error;
    use crate::platform::vendors::{cisco_ios, hp_procurve, linux};

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn procurve(session: ScriptedSession) -> CliSession<ScriptedSession> {
        CliSession::new(session, hp_procurve::platform(), TIMEOUT).unwrap()
    }

    #[tokio::test]
    async fn test_open_dismisses_banner() {
        let session = ScriptedSession::new(
            b"\x1b[2J\x1b[1;1HHP J9726A Switch 2920-24G\r\nPress any key to continue\x1b[?25h",
        )
        .reply(b"\r\n\x1b[1;1HHP-2920> ")
        .reply(b"no page\r\nHP-2920> ");

        let mut cli = procurve(session);
        let banner = cli.open().await.unwrap();

        assert!(banner.contains("Press any key to continue"));
        assert_eq!(cli.current_mode(), Some("exec"));
        assert_eq!(cli.session_mut().sent, vec!["\n", "no page\n"]);
    }

    #[tokio::test]
    async fn test_send_command_normalizes() {
        let session = ScriptedSession::new(b"HP-2920# ")
            .reply(b"no page\r\nHP-2920# ")
            .reply(b"show version\r\n\x1b[2K Image stamp:    /ws/swbuildm\r\n\x1b[1;1HHP-2920# ");

        let mut cli = procurve(session);
        cli.open().await.unwrap();

        let response = cli.send_command("show version").await.unwrap();
        assert!(response.is_success());
        assert_eq!(response.result, " Image stamp:    /ws/swbuildm");
        assert_eq!(response.prompt, "HP-2920#");
    }

    #[tokio::test]
    async fn test_failure_signature_marks_response() {
        let session = ScriptedSession::new(b"rtr1#")
            .reply(b"terminal length 0\r\nrtr1#")
            .reply(b"terminal width 512\r\nrtr1#")
            .reply(b"shw ver\r\n% Invalid input detected at '^' marker.\r\nrtr1#");

        let mut cli = CliSession::new(session, cisco_ios::platform(), TIMEOUT).unwrap();
        cli.open().await.unwrap();

        let response = cli.send_command("shw ver").await.unwrap();
        assert_eq!(response.failure_message.as_deref(), Some("% Invalid input detected"));
    }

    #[tokio::test]
    async fn test_enable_with_secret() {
        let session = ScriptedSession::new(b"HP-2920> ")
            .reply(b"no page\r\nHP-2920> ")
            .reply(b"enable\r\nPassword: ")
            .reply(b"\r\nHP-2920# ");

        let mut cli = procurve(session);
        cli.open().await.unwrap();

        let secret = SecretString::from("manager");
        cli.enable(Some(&secret)).await.unwrap();

        assert_eq!(cli.current_mode(), Some("privilege_exec"));
        assert_eq!(cli.session_mut().sent.last().map(String::as_str), Some("manager\n"));
    }

    #[tokio::test]
    async fn test_enable_without_secret_fails() {
        let session = ScriptedSession::new(b"HP-2920> ")
            .reply(b"no page\r\nHP-2920> ")
            .reply(b"enable\r\nPassword: ");

        let mut cli = procurve(session);
        cli.open().await.unwrap();

        let err = cli.enable(None).await.unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::SecretRequired { .. })));
    }

    #[tokio::test]
    async fn test_enable_without_password_prompt() {
        let session = ScriptedSession::new(b"HP-2920> ")
            .reply(b"no page\r\nHP-2920> ")
            .reply(b"enable\r\nHP-2920# ");

        let mut cli = procurve(session);
        cli.open().await.unwrap();
        cli.enable(None).await.unwrap();
        assert_eq!(cli.current_mode(), Some("privilege_exec"));
    }

    #[tokio::test]
    async fn test_config_set_returns_to_start_mode() {
        let session = ScriptedSession::new(b"HP-2920# ")
            .reply(b"no page\r\nHP-2920# ")
            .reply(b"configure terminal\r\nHP-2920(config)# ")
            .reply(b"vlan 10\r\nHP-2920(vlan-10)# ")
            .reply(b"name vlan_10\r\nHP-2920(vlan-10)# ")
            .reply(b"end\r\nHP-2920# ");

        let mut cli = procurve(session);
        cli.open().await.unwrap();

        let commands = vec!["vlan 10".to_string(), "name vlan_10".to_string()];
        let responses = cli.send_config_set(&commands, None).await.unwrap();

        assert_eq!(responses.len(), 2);
        assert!(responses.iter().all(Response::is_success));
        assert_eq!(cli.current_mode(), Some("privilege_exec"));
        assert_eq!(
            cli.session_mut().sent[1..],
            ["configure terminal\n", "vlan 10\n", "name vlan_10\n", "end\n"]
        );
    }

    #[tokio::test]
    async fn test_config_set_without_config_mode() {
        let session = ScriptedSession::new(b"user@host:~$ ")
            .reply(b"echo hi\r\nhi\r\nuser@host:~$ ");

        let mut cli = CliSession::new(session, linux::platform(), TIMEOUT).unwrap();
        cli.open().await.unwrap();

        let responses = cli
            .send_config_set(&["echo hi".to_string()], None)
            .await
            .unwrap();
        assert_eq!(responses[0].result, "hi");
    }

    #[tokio::test]
    async fn test_prompt_timeout() {
        let session = ScriptedSession::new(b"still booting...");
        let mut cli = procurve(session);
        let err = cli.open().await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::PatternTimeout(_))));
    }
}

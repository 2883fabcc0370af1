//! Configuration push driven by a resolved parameter document.

use std::time::Duration;

use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::driver::{Driver, DriverBuilder, transcript};
use crate::error::{Error, ParamError, Result, TransportError};
use crate::params::{ConnectionKind, ModuleResult, ResolvedParams};
use crate::platform::PlatformRegistry;
use crate::transport::HostKeyVerification;

/// Connect, optionally enable, send the command set in configuration mode
/// and return the transcript.
pub async fn run(
    params: &ResolvedParams,
    registry: &PlatformRegistry,
    timeout: Duration,
) -> Result<String> {
    if params.connection == ConnectionKind::Telnet {
        return Err(TransportError::UnsupportedConnection("telnet").into());
    }

    let platform = registry.require(params.platform_name())?.clone();

    let mut builder = DriverBuilder::new(&params.host)
        .port(params.port)
        .username(&params.username)
        .auth(params.auth_method())
        .custom_platform(platform)
        .timeout(timeout)
        .host_key_verification(HostKeyVerification::AcceptNew);
    if let Some(secret) = &params.secret {
        builder = builder.secret(SecretString::from(secret.expose_secret().to_owned()));
    }
    let mut driver = builder.build()?;

    info!("pushing {} commands to {}:{}", params.commands.len(), params.host, params.port);
    driver.open().await?;
    let outcome = apply(&mut driver, &params.commands, params.secret.is_some()).await;
    if let Err(e) = driver.close().await {
        warn!("error closing connection: {}", e);
    }
    outcome
}

/// Send `commands` as a configuration set on an open driver.
///
/// Any response matching a platform error signature fails the whole run,
/// carrying the full transcript.
pub async fn apply<D: Driver>(driver: &mut D, commands: &[String], enable: bool) -> Result<String> {
    if enable {
        driver.enable().await?;
    }

    let responses = driver.send_config_set(commands).await?;
    let output = transcript(&responses);

    if let Some(failed) = responses.iter().find(|r| !r.is_success()) {
        debug!(
            "command {:?} matched {:?}",
            failed.command, failed.failure_message
        );
        return Err(ParamError::DeviceError { output }.into());
    }

    Ok(output)
}

/// Map a run outcome to the printed module result.
pub fn report(outcome: Result<String>) -> ModuleResult {
    match outcome {
        Ok(output) => ModuleResult::changed(output),
        Err(Error::Params(ParamError::DeviceError { output })) => {
            let msg = ParamError::DeviceError {
                output: output.clone(),
            }
            .to_string();
            ModuleResult::failed(msg).with_response(output)
        }
        Err(e) => ModuleResult::failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::scripted::ScriptedSession;
    use crate::driver::{CliSession, Response};
    use crate::platform::vendors::hp_procurve;

    /// Driver over a scripted session, for exercising [`apply`].
    struct ScriptedDriver {
        cli: CliSession<ScriptedSession>,
        secret: Option<SecretString>,
    }

    impl ScriptedDriver {
        async fn start(session: ScriptedSession, secret: Option<&str>) -> Self {
            let mut cli =
                CliSession::new(session, hp_procurve::platform(), Duration::from_millis(200))
                    .unwrap();
            cli.open().await.unwrap();
            Self {
                cli,
                secret: secret.map(|s| SecretString::from(s.to_string())),
            }
        }
    }

    impl Driver for ScriptedDriver {
        async fn open(&mut self) -> Result<()> {
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }

        async fn send_command(&mut self, command: &str) -> Result<Response> {
            self.cli.send_command(command).await
        }

        async fn send_config_set(&mut self, commands: &[String]) -> Result<Vec<Response>> {
            self.cli.send_config_set(commands, self.secret.as_ref()).await
        }

        async fn enable(&mut self) -> Result<()> {
            self.cli.enable(self.secret.as_ref()).await
        }

        fn is_open(&self) -> bool {
            true
        }

        fn is_alive(&self) -> bool {
            true
        }

        fn current_mode(&self) -> Option<&str> {
            self.cli.current_mode()
        }
    }

    fn vlan_commands() -> Vec<String> {
        vec!["vlan 10".into(), "name vlan_10".into()]
    }

    #[tokio::test]
    async fn test_apply_with_enable() {
        let session = ScriptedSession::new(b"HP-2920> ")
            .reply(b"no page\r\nHP-2920> ")
            .reply(b"enable\r\nPassword: ")
            .reply(b"\r\nHP-2920# ")
            .reply(b"configure terminal\r\nHP-2920(config)# ")
            .reply(b"vlan 10\r\nHP-2920(vlan-10)# ")
            .reply(b"name vlan_10\r\nHP-2920(vlan-10)# ")
            .reply(b"end\r\nHP-2920# ");

        let mut driver = ScriptedDriver::start(session, Some("manager")).await;
        let output = apply(&mut driver, &vlan_commands(), true).await.unwrap();

        assert_eq!(output, "vlan 10\r\nHP-2920(vlan-10)# name vlan_10\r\nHP-2920(vlan-10)# ");
        assert_eq!(driver.current_mode(), Some("privilege_exec"));
    }

    #[tokio::test]
    async fn test_apply_reports_device_error() {
        let session = ScriptedSession::new(b"HP-2920# ")
            .reply(b"no page\r\nHP-2920# ")
            .reply(b"configure terminal\r\nHP-2920(config)# ")
            .reply(b"vlan 5000\r\nValue out of range.\r\nHP-2920(config)# ")
            .reply(b"end\r\nHP-2920# ");

        let mut driver = ScriptedDriver::start(session, None).await;
        let outcome = apply(&mut driver, &["vlan 5000".to_string()], false).await;

        let result = report(outcome);
        assert!(result.failed);
        assert!(
            result
                .msg
                .as_deref()
                .is_some_and(|m| m.starts_with("Error executing command:"))
        );
        assert!(result.response.is_some_and(|r| r.contains("Value out of range")));
    }

    #[tokio::test]
    async fn test_telnet_is_not_dialed() {
        let params = crate::params::ModuleParams::from_json(
            r#"{"connection": "telnet", "platform": "cisco_ios", "host": "192.0.2.7",
                "username": "u", "password": "p", "commands": ["show clock"]}"#,
        )
        .unwrap()
        .resolve()
        .unwrap();

        let err = run(&params, &PlatformRegistry::with_builtins(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::UnsupportedConnection("telnet"))
        ));
    }

    #[test]
    fn test_report_success() {
        let result = report(Ok("vlan 10\r\nsw# ".into()));
        assert!(result.changed);
        assert_eq!(result.response.as_deref(), Some("vlan 10\r\nsw# "));
    }
}

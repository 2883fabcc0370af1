mod cli;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::error;

use cli::{Cli, Command, ConnectArgs};
use netshell::channel::ShellReader;
use netshell::driver::{Driver, DriverBuilder};
use netshell::params::{ModuleParams, ModuleResult};
use netshell::platform::PlatformRegistry;
use netshell::script::ShellScript;
use netshell::transport::SshTransport;
use netshell::{Error, automation};

/// Commands the shell and command front-ends run when none are given.
const DEFAULT_COMMANDS: &[&str] = &["show version", "show interfaces"];

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Shell(args) => exit(shell(&args).await),
        Command::Command {
            connect,
            enable,
            config,
        } => exit(command(&connect, enable, config).await),
        Command::Module { args, timeout } => module(&args, Duration::from_secs(timeout)).await,
    }
}

fn exit(result: Result<(), Error>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn shell(args: &ConnectArgs) -> Result<(), Error> {
    let commands = args.commands_or(DEFAULT_COMMANDS)?;

    let transport = SshTransport::connect(&args.ssh_config()).await?;
    let mut shell = transport.open_shell().await?;

    ShellScript::new(&commands)
        .run(&mut shell, &ShellReader::default(), |step| {
            println!("{}", step.text)
        })
        .await?;

    shell.close().await?;
    transport.close().await
}

async fn command(args: &ConnectArgs, enable: bool, config: bool) -> Result<(), Error> {
    let commands = args.commands_or(DEFAULT_COMMANDS)?;

    let mut builder = DriverBuilder::new(&args.host)
        .port(args.port)
        .username(&args.username)
        .auth(args.auth())
        .platform(&args.platform)
        .timeout(args.timeout())
        .host_key_verification(args.host_key_checking.into());
    if let Some(secret) = args.secret() {
        builder = builder.secret(secret);
    }
    let mut driver = builder.build()?;

    driver.open().await?;
    if enable {
        driver.enable().await?;
    }

    let responses = if config {
        driver.send_config_set(&commands).await?
    } else {
        driver.send_commands(&commands).await?
    };

    for response in &responses {
        if let Some(signature) = &response.failure_message {
            error!("'{}' failed ({})", response.command, signature);
        }
        println!("{}", response.result);
    }

    driver.close().await
}

async fn module(path: &std::path::Path, timeout: Duration) -> ExitCode {
    let result = match std::fs::read_to_string(path) {
        Ok(document) => match ModuleParams::from_json(&document).and_then(ModuleParams::resolve) {
            Ok(params) => {
                let registry = PlatformRegistry::with_builtins();
                automation::report(automation::run(&params, &registry, timeout).await)
            }
            Err(e) => ModuleResult::failed(e.to_string()),
        },
        Err(e) => ModuleResult::failed(format!("unable to read {}: {}", path.display(), e)),
    };

    println!("{}", result.to_json());
    if result.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

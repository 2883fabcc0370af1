//! Read the version of an HP ProCurve switch and add a VLAN.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example procurve_vlan -- --host 172.16.1.82 --user manager --password manager
//! ```
//!
//! Pass `--secret` when the switch asks for a manager password on `enable`.

use std::time::Duration;

use clap::Parser;
use netshell::{Driver, DriverBuilder};
use secrecy::SecretString;

#[derive(Parser, Debug)]
struct Args {
    /// Switch hostname or IP
    #[arg(long)]
    host: String,

    /// Login user
    #[arg(long, default_value = "manager")]
    user: String,

    /// Login password
    #[arg(long)]
    password: String,

    /// Manager password for `enable`
    #[arg(long)]
    secret: Option<String>,

    /// VLAN to create
    #[arg(long, default_value_t = 10)]
    vlan: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = DriverBuilder::new(&args.host)
        .username(&args.user)
        .password(&args.password)
        .platform("hp_procurve")
        .timeout(Duration::from_secs(30));
    if let Some(secret) = args.secret {
        builder = builder.secret(SecretString::from(secret));
    }
    let mut driver = builder.build()?;

    driver.open().await?;
    println!("Connected, mode: {:?}", driver.current_mode());

    let response = driver.send_command("show version").await?;
    println!("{}", response.result);
    println!("{}", "-".repeat(50));

    driver.enable().await?;
    let responses = driver
        .send_config_set(&[
            format!("vlan {}", args.vlan),
            format!("name vlan_{}", args.vlan),
        ])
        .await?;

    for response in &responses {
        match &response.failure_message {
            Some(signature) => eprintln!("{} failed: {}", response.command, signature),
            None => println!("{} ok", response.command),
        }
    }

    driver.close().await?;
    Ok(())
}

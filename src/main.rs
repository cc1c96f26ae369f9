//! SmartStart CLI - Main Entry Point
//!
//! Thin command-line shell over the SmartStart client library: resolves
//! credentials, picks a vehicle, sends one command, prints one line.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use smartstart::{logging, Config, DeviceId, SessionId, SmartStart};

#[derive(Parser)]
#[command(name = "smartstart", version)]
#[command(about = "Remote control for Viper SmartStart equipped vehicles")]
struct Cli {
    /// Account username (falls back to SMARTSTART_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Account password (falls back to SMARTSTART_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// API base URL (falls back to SMARTSTART_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Reuse an existing session id instead of logging in
    #[arg(long)]
    session_id: Option<String>,

    /// Select the vehicle by name (fuzzy match) instead of the first device
    #[arg(long)]
    device: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lock the vehicle
    #[command(alias = "arm")]
    Lock,

    /// Unlock the vehicle
    #[command(alias = "disarm")]
    Unlock,

    /// Start the engine
    Start,

    /// Stop the engine
    Stop,

    /// Show the fastest recorded speed
    Speed,

    /// Show the vehicle's last known address
    Location,

    /// List the devices on the account
    Devices,

    /// List the commands a device supports
    Actions {
        /// Device index in the account's asset list
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();

    let config = Config {
        username: cli
            .username
            .or_else(|| std::env::var("SMARTSTART_USERNAME").ok()),
        password: cli
            .password
            .or_else(|| std::env::var("SMARTSTART_PASSWORD").ok()),
        api_url: cli
            .api_url
            .or_else(|| std::env::var("SMARTSTART_API_URL").ok())
            .unwrap_or_else(|| smartstart::config::DEFAULT_API_URL.to_string()),
        session_id: cli.session_id.map(SessionId::new),
        ..Config::default()
    };

    let mut car = SmartStart::new(config)?;

    let device_id: Option<DeviceId> = match &cli.device {
        Some(name) => match car.get_device_id_by_name(name).await? {
            Some(id) => Some(id),
            None => bail!("no device matching \"{name}\""),
        },
        None => None,
    };

    match cli.command {
        Command::Lock => {
            car.arm(device_id.as_ref()).await?;
            println!("Sent lock command");
        }
        Command::Unlock => {
            car.disarm(device_id.as_ref()).await?;
            println!("Sent unlock command");
        }
        Command::Start => {
            car.start(device_id.as_ref()).await?;
            println!("Sent start command");
        }
        Command::Stop => {
            car.stop(device_id.as_ref()).await?;
            println!("Sent stop command");
        }
        Command::Speed => {
            let result = car.top_speed(device_id.as_ref()).await?;
            match result.pointer("/Return/Results/Device/FastestSpeed") {
                Some(Value::String(speed)) => println!("{speed}"),
                Some(speed) => println!("{speed}"),
                None => eprintln!("Could not get the top speed"),
            }
        }
        Command::Location => {
            let result = car.locate(device_id.as_ref()).await?;
            print_location(&result);
        }
        Command::Devices => {
            let assets = car.get_assets().await?;
            for (index, device) in assets.iter().enumerate() {
                println!("{index}: {} ({})", device.name, device.device_id);
            }
        }
        Command::Actions { index } => {
            for action in car.get_actions(index).await? {
                println!("{action}");
            }
        }
    }

    Ok(())
}

/// The address field is tab-separated with a trailing junk segment.
fn print_location(result: &Value) {
    match result
        .pointer("/Return/Results/Device/Address")
        .and_then(Value::as_str)
    {
        Some(address) if !address.is_empty() => {
            let mut parts: Vec<&str> = address.split('\t').collect();
            parts.pop();
            println!("{}", parts.join(", "));
        }
        Some(_) => eprintln!("Could not locate the car (1)"),
        None => eprintln!("Could not locate the car (2)"),
    }
}

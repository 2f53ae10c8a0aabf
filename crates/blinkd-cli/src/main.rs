#![deny(unsafe_code)]

//! blinkd CLI — run the LED indicator daemon and control it.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blinkd_config::AppConfig;
use blinkd_core::ipc::server::socket_path_from_config;
use blinkd_core::{CdevLine, Daemon, IpcClient, artifacts};

/// blinkd — drive a GPIO indicator LED on, off, or blinking.
#[derive(Parser)]
#[command(name = "blinkd", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service name override.
    #[arg(short = 's', long)]
    service_name: Option<String>,

    /// Object path override.
    #[arg(short = 'o', long)]
    object_path: Option<String>,

    /// Interface name override.
    #[arg(short = 'i', long)]
    interface_name: Option<String>,

    /// Control socket path override.
    #[arg(long)]
    socket: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the LED indicator daemon.
    Service {
        /// GPIO chip name.
        #[arg(short = 'c', long)]
        chip: Option<String>,

        /// GPIO line offset.
        #[arg(short = 'l', long)]
        line: Option<u32>,
    },

    /// Set the LED mode: "on", "off", or "blink".
    Set { action: String },

    /// Print the current LED mode.
    Get,

    /// Print the control endpoint access-policy document.
    Policyfile,

    /// Print the systemd service unit.
    Unitfile {
        /// GPIO chip name.
        #[arg(short = 'c', long)]
        chip: Option<String>,

        /// GPIO line offset.
        #[arg(short = 'l', long)]
        line: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli).await?;

    // Set up tracing subscriber; -v flags win over the configured level
    let filter = match cli.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Service { chip, line } => cmd_service(config, chip, line).await?,
        Commands::Set { action } => cmd_set(&config, &action).await?,
        Commands::Get => cmd_get(&config).await?,
        Commands::Policyfile => cmd_policyfile(&config),
        Commands::Unitfile { chip, line } => cmd_unitfile(config, chip, line)?,
    }

    Ok(())
}

/// Load the config file (or defaults) and fold in the global overrides.
async fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .await
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(name) = &cli.service_name {
        config.endpoint.service_name = name.clone();
    }
    if let Some(path) = &cli.object_path {
        config.endpoint.object_path = path.clone();
    }
    if let Some(name) = &cli.interface_name {
        config.endpoint.interface_name = name.clone();
    }
    if let Some(socket) = &cli.socket {
        config.endpoint.socket_path = Some(socket.clone());
    }

    config.validate()?;
    Ok(config)
}

fn apply_gpio_overrides(config: &mut AppConfig, chip: Option<String>, line: Option<u32>) {
    if let Some(chip) = chip {
        config.gpio.chip = chip;
    }
    if let Some(line) = line {
        config.gpio.line = line;
    }
}

async fn cmd_service(
    mut config: AppConfig,
    chip: Option<String>,
    line: Option<u32>,
) -> Result<()> {
    apply_gpio_overrides(&mut config, chip, line);
    config.validate()?;

    let led = CdevLine::open(&config.gpio.chip, config.gpio.line)?;
    Daemon::new(config).run(led).await?;
    Ok(())
}

fn client(config: &AppConfig) -> IpcClient {
    IpcClient::new(
        socket_path_from_config(config),
        config.endpoint.object_path.clone(),
    )
}

async fn cmd_set(config: &AppConfig, action: &str) -> Result<()> {
    let resp = client(config).set(action).await?;
    if !resp.ok {
        bail!("daemon rejected action {action:?} (expected \"on\", \"off\", or \"blink\")");
    }
    println!("success");
    Ok(())
}

async fn cmd_get(config: &AppConfig) -> Result<()> {
    let resp = client(config).get().await?;
    println!("{}", resp.action);
    Ok(())
}

fn cmd_policyfile(config: &AppConfig) {
    print!(
        "{}",
        artifacts::render_policyfile(
            &config.endpoint.service_name,
            &config.endpoint.interface_name
        )
    );
}

fn cmd_unitfile(mut config: AppConfig, chip: Option<String>, line: Option<u32>) -> Result<()> {
    apply_gpio_overrides(&mut config, chip, line);
    config.validate()?;

    let exe = std::env::current_exe().context("failed to resolve executable path")?;
    print!("{}", artifacts::render_unitfile(&exe, &config));
    Ok(())
}

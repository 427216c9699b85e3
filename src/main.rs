//! Light Link - button-driven sensor link binary
//!
//! Runs the control loop against the configured sensor node, or sends a
//! single control message for bench testing the node.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use light_link::{
    edge_channel, run_until, ControlLoop, ControlMessage, DefaultOutputs, LinkConfig, LinkError,
    UdpLink,
};
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::{error, info, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "light_link")]
#[command(about = "Button-driven UDP light sensor link")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    long_about = "Start/stop a UDP conversation with a light sensor node and show readings on LEDs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sensor node address
    #[arg(long)]
    peer: Option<String>,

    /// Sensor node UDP port
    #[arg(long)]
    peer_port: Option<u16>,

    /// Local UDP port to listen on
    #[arg(short, long)]
    listen_port: Option<u16>,

    /// Silence allowed before entering fault, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop (default)
    Run,

    /// Send one control message to the sensor node and exit
    Send(SendArgs),

    /// Print the effective configuration and exit
    Config(ConfigArgs),
}

#[derive(Args)]
struct SendArgs {
    /// Message to send: start or stop
    message: ControlMessage,
}

#[derive(Args)]
struct ConfigArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = load_config(&cli)?;

    match &cli.command {
        Some(Commands::Run) | None => run_command(&config).await?,
        Some(Commands::Send(args)) => send_command(&config, args).await?,
        Some(Commands::Config(args)) => config_command(&config, args)?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(build_subscriber(cli))?;
    Ok(())
}

fn log_level(cli: &Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

// RUST_LOG directives are layered on top of the flag-selected default.
fn build_subscriber(cli: &Cli) -> impl Subscriber + Send + Sync {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level(cli)).into())
        .from_env_lossy();

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish()
}

fn load_config(cli: &Cli) -> anyhow::Result<LinkConfig> {
    let mut config = match &cli.config {
        Some(path) => LinkConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => LinkConfig::default(),
    };

    if let Some(peer) = &cli.peer {
        config = config.with_peer_host(peer.clone());
    }
    if let Some(port) = cli.peer_port {
        config = config.with_peer_port(port);
    }
    if let Some(port) = cli.listen_port {
        config = config.with_listen_port(port);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run_command(config: &LinkConfig) -> anyhow::Result<()> {
    info!("Starting light link controller...");

    let link = UdpLink::bind(config)
        .await
        .context("opening the sensor link")?;
    let outputs = open_outputs(config)?;
    let control = ControlLoop::new(config, link, outputs)?;

    let (tx, rx) = edge_channel();

    #[cfg(feature = "gpio")]
    let _button = light_link::GpioButton::attach(config.pins.button, tx)
        .context("attaching the push button")?;

    #[cfg(not(feature = "gpio"))]
    {
        info!("GPIO support not compiled, press Enter to toggle the session");
        let _stdin = light_link::spawn_stdin_button(tx);
    }

    info!("Controller configuration:");
    info!("  - Sensor node: {}:{}", config.peer_host, config.peer_port);
    info!("  - Listening on: {}:{}", config.listen_host, config.listen_port);
    info!(
        "  - Thresholds: low < {}, high >= {}",
        config.low_threshold, config.medium_threshold
    );
    info!("  - Timeout: {}ms", config.timeout_ms);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await.map_err(interrupt_failure) {
            error!("{}", e);
        }
    };

    let control = run_until(control, rx, config.poll_interval(), shutdown).await;
    let report = serde_json::to_string(&control.report(Instant::now()))?;
    info!("Program interrupted by user, final report: {}", report);

    drop(control);
    info!("GPIO cleanup done.");

    Ok(())
}

fn interrupt_failure(e: std::io::Error) -> LinkError {
    LinkError::system_error(format!("Failed to listen for interrupt: {}", e))
}

#[cfg(feature = "gpio")]
fn open_outputs(config: &LinkConfig) -> anyhow::Result<DefaultOutputs> {
    DefaultOutputs::new(&config.pins).context("claiming LED pins")
}

#[cfg(not(feature = "gpio"))]
fn open_outputs(_config: &LinkConfig) -> anyhow::Result<DefaultOutputs> {
    Ok(DefaultOutputs::new())
}

async fn send_command(config: &LinkConfig, args: &SendArgs) -> anyhow::Result<()> {
    // Any free local port will do for a one-off send.
    let local = if config.peer_addr()?.is_ipv4() {
        "0.0.0.0:0"
    } else {
        "[::]:0"
    };
    let link = UdpLink::bind_addr(local.parse()?, config.peer_addr()?).await?;
    link.send_async(args.message).await?;
    println!("Sent '{}' to {}", args.message, link.peer_addr());
    Ok(())
}

fn config_command(config: &LinkConfig, args: &ConfigArgs) -> anyhow::Result<()> {
    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        "pretty" => {
            println!("Light Link Configuration");
            println!("========================");
            println!("  Sensor node: {}:{}", config.peer_host, config.peer_port);
            println!("  Listen: {}:{}", config.listen_host, config.listen_port);
            println!(
                "  Thresholds: low < {}, medium < {}, high otherwise",
                config.low_threshold, config.medium_threshold
            );
            println!("  Timeout: {}ms", config.timeout_ms);
            println!("  Poll interval: {}ms", config.poll_interval_ms);
            println!("  Blink period: {}ms", config.blink_period_ms);
            println!("  Debounce: {}ms", config.debounce_ms);
            println!(
                "  Pins: button {}, red {}, yellow {}, green {}, white {}",
                config.pins.button,
                config.pins.red,
                config.pins.yellow,
                config.pins.green,
                config.pins.white
            );
        }
        other => {
            anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use light_link::{DEFAULT_LISTEN_PORT, DEFAULT_PEER_HOST, DEFAULT_PEER_PORT};

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["light_link", "--peer", "10.0.0.9", "--listen-port", "9000"])
            .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.peer_host, "10.0.0.9");
        assert_eq!(config.listen_port, 9000);
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["light_link"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.peer_host, DEFAULT_PEER_HOST);
        assert_eq!(config.peer_port, DEFAULT_PEER_PORT);
        assert_eq!(config.listen_port, DEFAULT_LISTEN_PORT);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_log_level_flags() {
        // Assumes RUST_LOG is unset in the test environment.
        let cases = [
            (vec!["light_link"], LevelFilter::WARN),
            (vec!["light_link", "--verbose"], LevelFilter::INFO),
            (vec!["light_link", "--debug"], LevelFilter::DEBUG),
            (vec!["light_link", "-v", "-d"], LevelFilter::DEBUG),
        ];

        for (args, expected) in cases {
            let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
            let subscriber = build_subscriber(&cli);
            assert_eq!(subscriber.max_level_hint(), Some(expected), "args {:?}", args);
        }
    }

    #[test]
    fn test_interrupt_failure_is_system_error() {
        let err = interrupt_failure(std::io::Error::new(
            std::io::ErrorKind::Other,
            "signal driver gone",
        ));
        assert!(matches!(err, LinkError::System(_)));
        assert!(err.to_string().contains("signal driver gone"));
    }

    #[test]
    fn test_send_subcommand() {
        let cli = Cli::try_parse_from(["light_link", "send", "stop"]).unwrap();
        match cli.command {
            Some(Commands::Send(args)) => assert_eq!(args.message, ControlMessage::Stop),
            _ => panic!("expected send subcommand"),
        }
        assert!(Cli::try_parse_from(["light_link", "send", "pause"]).is_err());
    }
}

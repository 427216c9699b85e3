//! # Light Link - button-driven sensor link for Raspberry Pi
//!
//! Talks to a remote light sensor node over UDP and shows what it reports
//! on four LEDs. A push button starts and stops the conversation. While a
//! session is running, every reading lights one, two or three level LEDs.
//! If the node goes quiet past the timeout, the white LED blinks until the
//! session is stopped.
//!
//! ## Features
//!
//! - **Single-owner control loop**: one task owns session, link and LEDs
//! - **Non-blocking fault blink**: a stop press is honoured mid-fault
//! - **GPIO support**: rppal-backed button and LEDs (feature-gated)
//! - **Off-Pi operation**: stdin stands in for the button, LEDs are in-memory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use light_link::{edge_channel, run_until, ControlLoop, LinkConfig, MemoryOutputs, UdpLink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LinkConfig::default().with_peer_host("192.168.1.82");
//!     let link = UdpLink::bind(&config).await?;
//!     let control = ControlLoop::new(&config, link, MemoryOutputs::new())?;
//!
//!     let (_tx, rx) = edge_channel();
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     run_until(control, rx, config.poll_interval(), shutdown).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod indicator;
pub mod input;
pub mod link;
pub mod runtime;
pub mod session;

// Re-export public API
pub use config::{LinkConfig, PinConfig};
pub use error::{LinkError, ReadingError, Result};
pub use indicator::{DefaultOutputs, IndicatorDriver, Led, MemoryOutputs, OutputPins, OutputState};
pub use input::{edge_channel, post_edge, spawn_line_button, spawn_stdin_button, Edge};
pub use link::{parse_reading, ControlMessage, Datagram, DatagramLink, Reading, UdpLink};
pub use runtime::{run_until, ControlLoop, LoopReport, LoopStats};
pub use session::{EdgeOutcome, IndicatorLevel, SessionController, SessionState, Thresholds};

#[cfg(feature = "gpio")]
pub use indicator::RaspberryPiOutputs;

#[cfg(feature = "gpio")]
pub use input::GpioButton;

/// Default address of the remote sensor node
pub const DEFAULT_PEER_HOST: &str = "192.168.1.82";

/// Default UDP port of the remote sensor node
pub const DEFAULT_PEER_PORT: u16 = 8266;

/// Default local UDP port readings arrive on
pub const DEFAULT_LISTEN_PORT: u16 = 8266;

/// Readings below this are shown as `Low`
pub const LOW_THRESHOLD: u32 = 300;

/// Readings at or above this are shown as `High`
pub const MEDIUM_THRESHOLD: u32 = 700;

/// Silence allowed during a session before entering fault, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Control loop poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Fault indicator toggle period in milliseconds
pub const DEFAULT_BLINK_PERIOD_MS: u64 = 500;

/// Button debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

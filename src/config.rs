//! Controller configuration.

use crate::error::{LinkError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// BCM pin assignment for the button and the four LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// Momentary push button, wired to ground (internal pull-up)
    pub button: u8,
    /// First level indicator, lit for every reading
    pub red: u8,
    /// Second level indicator
    pub yellow: u8,
    /// Third level indicator
    pub green: u8,
    /// Session / fault indicator
    pub white: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            button: 18,
            red: 17,
            yellow: 27,
            green: 22,
            white: 23,
        }
    }
}

impl PinConfig {
    fn all(&self) -> [u8; 5] {
        [self.button, self.red, self.yellow, self.green, self.white]
    }
}

/// Configuration for the light link controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Address of the remote sensor node
    pub peer_host: String,
    /// UDP port of the remote sensor node
    pub peer_port: u16,
    /// Local address to bind the listening socket to
    pub listen_host: String,
    /// Local UDP port readings arrive on
    pub listen_port: u16,
    /// Readings below this are `Low`
    pub low_threshold: u32,
    /// Readings at or above this are `High`
    pub medium_threshold: u32,
    /// Silence allowed during a session before entering fault
    pub timeout_ms: u64,
    /// Receive / timeout-check cadence
    pub poll_interval_ms: u64,
    /// Fault indicator toggle period
    pub blink_period_ms: u64,
    /// Button edges closer together than this are ignored; 0 disables
    pub debounce_ms: u64,
    /// GPIO pin assignment
    pub pins: PinConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            peer_host: crate::DEFAULT_PEER_HOST.to_string(),
            peer_port: crate::DEFAULT_PEER_PORT,
            listen_host: "0.0.0.0".to_string(),
            listen_port: crate::DEFAULT_LISTEN_PORT,
            low_threshold: crate::LOW_THRESHOLD,
            medium_threshold: crate::MEDIUM_THRESHOLD,
            timeout_ms: crate::DEFAULT_TIMEOUT_MS,
            poll_interval_ms: crate::DEFAULT_POLL_INTERVAL_MS,
            blink_period_ms: crate::DEFAULT_BLINK_PERIOD_MS,
            debounce_ms: crate::DEFAULT_DEBOUNCE_MS,
            pins: PinConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LinkError::config_error(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the remote sensor node host.
    pub fn with_peer_host(mut self, host: impl Into<String>) -> Self {
        self.peer_host = host.into();
        self
    }

    /// Set the remote sensor node port.
    pub fn with_peer_port(mut self, port: u16) -> Self {
        self.peer_port = port;
        self
    }

    /// Set the local bind host.
    pub fn with_listen_host(mut self, host: impl Into<String>) -> Self {
        self.listen_host = host.into();
        self
    }

    /// Set the local listening port.
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    /// Set both classification thresholds.
    pub fn with_thresholds(mut self, low: u32, medium: u32) -> Self {
        self.low_threshold = low;
        self.medium_threshold = medium;
        self
    }

    /// Set the staleness timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the debounce window.
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Set the pin assignment.
    pub fn with_pins(mut self, pins: PinConfig) -> Self {
        self.pins = pins;
        self
    }

    /// Check the configuration for values the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.low_threshold >= self.medium_threshold {
            return Err(LinkError::config_error(format!(
                "low threshold ({}) must be below medium threshold ({})",
                self.low_threshold, self.medium_threshold
            )));
        }
        if self.timeout_ms == 0 || self.poll_interval_ms == 0 || self.blink_period_ms == 0 {
            return Err(LinkError::config_error(
                "timeout, poll interval and blink period must be non-zero",
            ));
        }

        let pins = self.pins.all();
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(LinkError::config_error(format!(
                    "GPIO {} is assigned more than once",
                    pin
                )));
            }
        }

        Ok(())
    }

    /// Resolve the remote peer address.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.peer_host, self.peer_port)
            .parse::<SocketAddr>()
            .map_err(|e| LinkError::config_error(format!("Invalid peer address: {}", e)))
    }

    /// Resolve the local bind address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.listen_host, self.listen_port)
            .parse::<SocketAddr>()
            .map_err(|e| LinkError::config_error(format!("Invalid listen address: {}", e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn blink_period(&self) -> Duration {
        Duration::from_millis(self.blink_period_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

//! Session states and the reading-to-level mapping.

use crate::error::{LinkError, Result};
use crate::link::Reading;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the controller is in a conversation with the sensor node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No conversation; readings are not polled
    #[default]
    Idle,
    /// Conversation started; readings are polled and displayed
    Active,
    /// Conversation started but the node went quiet past the timeout
    Fault,
}

impl SessionState {
    /// Whether a session has been started and not yet stopped.
    pub fn in_session(self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Active => "active",
            SessionState::Fault => "fault",
        };
        f.write_str(name)
    }
}

/// Three-step light level shown on the indicator LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorLevel {
    Low,
    Medium,
    High,
}

impl IndicatorLevel {
    /// Level outputs (out1, out2, out3) for this level.
    ///
    /// out1 is lit at every level. That is how the hardware has always
    /// behaved and is kept as-is.
    pub fn outputs(self) -> [bool; 3] {
        match self {
            IndicatorLevel::Low => [true, false, false],
            IndicatorLevel::Medium => [true, true, false],
            IndicatorLevel::High => [true, true, true],
        }
    }
}

/// Ordered pair of classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    low: u32,
    medium: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: crate::LOW_THRESHOLD,
            medium: crate::MEDIUM_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Build thresholds, requiring `low < medium`.
    pub fn new(low: u32, medium: u32) -> Result<Self> {
        if low >= medium {
            return Err(LinkError::config_error(format!(
                "low threshold ({}) must be below medium threshold ({})",
                low, medium
            )));
        }
        Ok(Self { low, medium })
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn medium(&self) -> u32 {
        self.medium
    }

    /// Classify a reading. Total over every `u32`.
    pub fn classify(&self, reading: Reading) -> IndicatorLevel {
        match reading.value() {
            v if v < self.low => IndicatorLevel::Low,
            v if v < self.medium => IndicatorLevel::Medium,
            _ => IndicatorLevel::High,
        }
    }
}

//! Level display and fault blinking on top of an [`OutputPins`] backend.
//!
//! Blinking is time-driven: [`IndicatorDriver::tick`] toggles the white
//! output once a full period has elapsed, so the control loop never waits
//! on it.

use super::{Led, OutputPins, OutputState};
use crate::session::IndicatorLevel;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

pub struct IndicatorDriver<O: OutputPins> {
    outputs: O,
    blink_period: Duration,
    next_toggle: Option<Instant>,
}

impl<O: OutputPins> IndicatorDriver<O> {
    pub fn new(outputs: O, blink_period: Duration) -> Self {
        Self {
            outputs,
            blink_period,
            next_toggle: None,
        }
    }

    /// Show a light level on the three level outputs.
    ///
    /// Outputs already in the wanted state are not rewritten.
    pub fn apply_level(&mut self, level: IndicatorLevel) {
        for (led, on) in Led::LEVELS.into_iter().zip(level.outputs()) {
            self.write(led, on);
        }
        debug!("Indicators set for {:?} level", level);
    }

    /// Light the white output steadily for a newly started session.
    pub fn session_started(&mut self) {
        self.next_toggle = None;
        self.write(Led::White, true);
    }

    /// Start toggling the white output every blink period.
    pub fn begin_blink(&mut self, now: Instant) {
        if self.next_toggle.is_none() {
            info!("Fault indicator blinking every {:?}", self.blink_period);
            self.next_toggle = Some(now);
            self.tick(now);
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.next_toggle.is_some()
    }

    /// Advance the blink schedule. Does nothing when not blinking.
    pub fn tick(&mut self, now: Instant) {
        let Some(due) = self.next_toggle else {
            return;
        };
        if now < due {
            return;
        }

        let lit = self.outputs.state().white;
        self.outputs.set(Led::White, !lit);
        self.next_toggle = Some(now + self.blink_period);
    }

    /// Stop blinking and switch every output off.
    pub fn all_off(&mut self) {
        self.next_toggle = None;
        for led in Led::ALL {
            self.write(led, false);
        }
    }

    pub fn state(&self) -> OutputState {
        self.outputs.state()
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    fn write(&mut self, led: Led, on: bool) {
        if self.outputs.state().get(led) != on {
            self.outputs.set(led, on);
        }
    }
}

impl<O: OutputPins> Drop for IndicatorDriver<O> {
    fn drop(&mut self) {
        self.all_off();
    }
}

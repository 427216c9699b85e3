//! Output pin backends.
//!
//! The rppal backend is feature-gated so the controller builds and runs on
//! machines without a GPIO header.

use super::{Led, OutputState};
use tracing::debug;

/// Something that can switch the four indicator outputs.
pub trait OutputPins {
    /// Drive one output on or off.
    fn set(&mut self, led: Led, on: bool);

    /// Current state of every output.
    fn state(&self) -> OutputState;
}

/// In-memory outputs. Used off-Pi and in tests.
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    state: OutputState,
    writes: usize,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pin writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl OutputPins for MemoryOutputs {
    fn set(&mut self, led: Led, on: bool) {
        debug!("{:?} LED -> {}", led, if on { "on" } else { "off" });
        self.state.set(led, on);
        self.writes += 1;
    }

    fn state(&self) -> OutputState {
        self.state
    }
}

#[cfg(feature = "gpio")]
mod raspberry_pi {
    use super::*;
    use crate::config::PinConfig;
    use crate::error::{LinkError, Result};
    use rppal::gpio::{Gpio, OutputPin};

    /// Raspberry Pi indicator outputs using rppal.
    pub struct RaspberryPiOutputs {
        red: OutputPin,
        yellow: OutputPin,
        green: OutputPin,
        white: OutputPin,
        state: OutputState,
    }

    impl RaspberryPiOutputs {
        /// Claim the four LED pins and drive them low.
        pub fn new(pins: &PinConfig) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| {
                LinkError::gpio_error(format!("Failed to initialize GPIO: {}", e))
            })?;

            let claim = |pin: u8| -> Result<OutputPin> {
                let mut output = gpio
                    .get(pin)
                    .map_err(|e| {
                        LinkError::gpio_error(format!("Failed to access pin {}: {}", pin, e))
                    })?
                    .into_output();
                output.set_low();
                Ok(output)
            };

            Ok(Self {
                red: claim(pins.red)?,
                yellow: claim(pins.yellow)?,
                green: claim(pins.green)?,
                white: claim(pins.white)?,
                state: OutputState::default(),
            })
        }

        fn pin_mut(&mut self, led: Led) -> &mut OutputPin {
            match led {
                Led::Red => &mut self.red,
                Led::Yellow => &mut self.yellow,
                Led::Green => &mut self.green,
                Led::White => &mut self.white,
            }
        }
    }

    impl OutputPins for RaspberryPiOutputs {
        fn set(&mut self, led: Led, on: bool) {
            let pin = self.pin_mut(led);
            if on {
                pin.set_high();
            } else {
                pin.set_low();
            }
            self.state.set(led, on);
        }

        fn state(&self) -> OutputState {
            self.state
        }
    }
}

#[cfg(feature = "gpio")]
pub use raspberry_pi::RaspberryPiOutputs;

// Re-export the appropriate output backend
#[cfg(feature = "gpio")]
pub use raspberry_pi::RaspberryPiOutputs as DefaultOutputs;

#[cfg(not(feature = "gpio"))]
pub use self::MemoryOutputs as DefaultOutputs;

//! Indicator LEDs: three level outputs plus the session / fault output.

pub mod driver;
pub mod pins;

pub use driver::IndicatorDriver;
pub use pins::{DefaultOutputs, MemoryOutputs, OutputPins};

#[cfg(feature = "gpio")]
pub use pins::RaspberryPiOutputs;

use serde::{Deserialize, Serialize};

/// One of the four physical indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Led {
    /// out1
    Red,
    /// out2
    Yellow,
    /// out3
    Green,
    /// Session / fault indicator
    White,
}

impl Led {
    pub const ALL: [Led; 4] = [Led::Red, Led::Yellow, Led::Green, Led::White];
    pub const LEVELS: [Led; 3] = [Led::Red, Led::Yellow, Led::Green];
}

/// On/off snapshot of all four indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputState {
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
    pub white: bool,
}

impl OutputState {
    pub fn get(&self, led: Led) -> bool {
        match led {
            Led::Red => self.red,
            Led::Yellow => self.yellow,
            Led::Green => self.green,
            Led::White => self.white,
        }
    }

    pub fn set(&mut self, led: Led, on: bool) {
        match led {
            Led::Red => self.red = on,
            Led::Yellow => self.yellow = on,
            Led::Green => self.green = on,
            Led::White => self.white = on,
        }
    }

    /// Level outputs as (out1, out2, out3).
    pub fn levels(&self) -> (bool, bool, bool) {
        (self.red, self.yellow, self.green)
    }

    pub fn all_off(&self) -> bool {
        *self == Self::default()
    }
}

//! Session state machine and reading classification.

pub mod controller;
pub mod state;

pub use controller::{EdgeOutcome, SessionController};
pub use state::{IndicatorLevel, SessionState, Thresholds};

//! Button edge sources.
//!
//! Edge handlers run outside the control loop (on rppal's interrupt thread
//! or a line-reader thread), so they never touch session state. They stamp
//! the press and post it into the loop's channel.

use std::io::BufRead;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Queue depth for pending button edges.
pub const EDGE_QUEUE_DEPTH: usize = 16;

/// A single button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub at: Instant,
}

impl Edge {
    pub fn now() -> Self {
        Self { at: Instant::now() }
    }
}

/// Create the channel edge sources post into.
pub fn edge_channel() -> (mpsc::Sender<Edge>, mpsc::Receiver<Edge>) {
    mpsc::channel(EDGE_QUEUE_DEPTH)
}

/// Post an edge without blocking. Dropped if the loop is not keeping up.
pub fn post_edge(tx: &mpsc::Sender<Edge>) {
    if let Err(e) = tx.try_send(Edge::now()) {
        debug!("Dropping button edge: {}", e);
    }
}

/// Treat every line typed on stdin as a button press.
pub fn spawn_stdin_button(tx: mpsc::Sender<Edge>) -> JoinHandle<()> {
    thread::spawn(move || forward_lines(std::io::stdin().lock(), &tx))
}

/// Treat every line read from `reader` as a button press.
///
/// Reads happen on a plain OS thread that is never joined. A read that is
/// still pending cannot hold up runtime shutdown or process exit.
pub fn spawn_line_button<R>(reader: R, tx: mpsc::Sender<Edge>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || forward_lines(reader, &tx))
}

fn forward_lines<R: BufRead>(reader: R, tx: &mpsc::Sender<Edge>) {
    for line in reader.lines() {
        match line {
            Ok(_) => post_edge(tx),
            Err(e) => {
                warn!("Failed to read button input: {}", e);
                return;
            }
        }
    }
    debug!("Button input closed, keyboard button detached");
}

#[cfg(feature = "gpio")]
mod raspberry_pi {
    use super::*;
    use crate::error::{LinkError, Result};
    use rppal::gpio::{Gpio, InputPin, Trigger};

    /// Physical push button on a pull-up input. Pressing pulls the pin low.
    ///
    /// The interrupt stays armed for as long as this guard lives.
    pub struct GpioButton {
        _pin: InputPin,
    }

    impl GpioButton {
        pub fn attach(pin: u8, tx: mpsc::Sender<Edge>) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| {
                LinkError::gpio_error(format!("Failed to initialize GPIO: {}", e))
            })?;
            let mut input = gpio
                .get(pin)
                .map_err(|e| LinkError::gpio_error(format!("Failed to access pin {}: {}", pin, e)))?
                .into_input_pullup();

            input
                .set_async_interrupt(Trigger::FallingEdge, move |_| post_edge(&tx))
                .map_err(|e| {
                    LinkError::gpio_error(format!("Failed to arm interrupt on pin {}: {}", pin, e))
                })?;

            Ok(Self { _pin: input })
        }
    }
}

#[cfg(feature = "gpio")]
pub use raspberry_pi::GpioButton;

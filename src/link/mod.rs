//! Wire protocol and datagram transport to the remote sensor node.
//!
//! The node speaks plain UTF-8 text over UDP. We send one of two control
//! literals and receive readings whose last whitespace-delimited token is
//! the light intensity.

pub mod protocol;
pub mod udp;

pub use protocol::{parse_reading, ControlMessage, Reading};
pub use udp::UdpLink;

use crate::error::Result;
use std::net::SocketAddr;

/// A single inbound datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub from: SocketAddr,
}

/// Connectionless link to the sensor node.
pub trait DatagramLink {
    /// Send a control message to the peer. No acknowledgment is expected.
    fn send(&mut self, message: ControlMessage) -> Result<()>;

    /// Try to take one pending datagram without blocking.
    ///
    /// Returns `Ok(None)` when nothing is waiting.
    fn poll_datagram(&mut self) -> Result<Option<Datagram>>;
}

//! UDP transport on a non-blocking tokio socket.

use super::{ControlMessage, Datagram, DatagramLink};
use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info};

const RECV_BUFFER_SIZE: usize = 1024;

/// UDP link to the sensor node. The socket is closed when this is dropped.
pub struct UdpLink {
    socket: UdpSocket,
    peer: SocketAddr,
    buf: [u8; RECV_BUFFER_SIZE],
}

impl UdpLink {
    /// Bind the listening socket described by `config`.
    pub async fn bind(config: &LinkConfig) -> Result<Self> {
        let peer = config.peer_addr()?;
        let local = config.listen_addr()?;
        Self::bind_addr(local, peer).await
    }

    /// Bind to an explicit local address, talking to `peer`.
    pub async fn bind_addr(local: SocketAddr, peer: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local).await.map_err(|e| {
            LinkError::network_error(format!("Failed to bind UDP socket on {}: {}", local, e))
        })?;
        info!("Listening for sensor readings on udp://{}", socket.local_addr()?);

        Ok(Self {
            socket,
            peer,
            buf: [0; RECV_BUFFER_SIZE],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Send a control message, waiting for the socket to accept it.
    pub async fn send_async(&self, message: ControlMessage) -> Result<()> {
        self.socket
            .send_to(message.as_str().as_bytes(), self.peer)
            .await
            .map_err(|e| {
                LinkError::network_error(format!(
                    "Failed to send '{}' to {}: {}",
                    message, self.peer, e
                ))
            })?;
        info!("Sent UDP message: {} to {}", message, self.peer);
        Ok(())
    }

    /// Wait until the socket can take a datagram.
    pub async fn writable(&self) -> Result<()> {
        self.socket.writable().await?;
        Ok(())
    }

    /// Wait until a datagram is ready to be read.
    pub async fn readable(&self) -> Result<()> {
        self.socket.readable().await?;
        Ok(())
    }
}

impl DatagramLink for UdpLink {
    fn send(&mut self, message: ControlMessage) -> Result<()> {
        self.socket
            .try_send_to(message.as_str().as_bytes(), self.peer)
            .map_err(|e| {
                LinkError::network_error(format!(
                    "Failed to send '{}' to {}: {}",
                    message, self.peer, e
                ))
            })?;
        info!("Sent UDP message: {} to {}", message, self.peer);
        Ok(())
    }

    fn poll_datagram(&mut self) -> Result<Option<Datagram>> {
        match self.socket.try_recv_from(&mut self.buf) {
            Ok((len, from)) => {
                debug!("Received {} bytes from {}", len, from);
                Ok(Some(Datagram {
                    payload: self.buf[..len].to_vec(),
                    from,
                }))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

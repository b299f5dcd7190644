//! UDP datagram transport.

use std::{
    io,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
};

use crate::config::DEFAULT_MAX_DATAGRAM_SIZE;

use super::{FrameReceiver, FrameSender, ensure_whole_datagram};

/// Non-blocking UDP socket carrying one message per datagram.
///
/// Receiving works on any bound socket. Sending requires the socket to be
/// connected to its peer, see [`UdpTransport::connect`].
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    recv_buf: Vec<u8>,
}

impl UdpTransport {
    /// Bind a receiving socket to `addr`.
    pub fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        Self::from_socket(UdpSocket::bind(addr)?)
    }

    /// Bind to `local` and connect to `remote` for sending.
    pub fn connect(local: impl ToSocketAddrs, remote: impl ToSocketAddrs) -> io::Result<Self> {
        let socket = UdpSocket::bind(local)?;
        socket.connect(remote)?;
        Self::from_socket(socket)
    }

    /// Wrap an existing socket, switching it to non-blocking mode.
    pub fn from_socket(socket: UdpSocket) -> io::Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            recv_buf: vec![0; DEFAULT_MAX_DATAGRAM_SIZE],
        })
    }

    /// Override the largest datagram accepted by `recv_nonblocking`.
    ///
    /// Longer datagrams are truncated by the operating system.
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.recv_buf = vec![0; size];
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn get_ref(&self) -> &UdpSocket {
        &self.socket
    }

    pub fn into_inner(self) -> UdpSocket {
        self.socket
    }
}

impl FrameSender for UdpTransport {
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()> {
        let sent = self.socket.send(frame)?;
        ensure_whole_datagram(sent, frame)
    }
}

impl FrameReceiver for UdpTransport {
    fn recv_nonblocking(&mut self) -> io::Result<Vec<u8>> {
        let (len, _) = self.socket.recv_from(&mut self.recv_buf)?;
        Ok(self.recv_buf[..len].to_vec())
    }
}

//! Unix domain datagram transport.

use std::{io, os::unix::net::UnixDatagram, path::Path};

use crate::config::DEFAULT_MAX_DATAGRAM_SIZE;

use super::{FrameReceiver, FrameSender, ensure_whole_datagram};

/// Non-blocking Unix datagram socket carrying one message per datagram.
#[derive(Debug)]
pub struct UnixDatagramTransport {
    socket: UnixDatagram,
    recv_buf: Vec<u8>,
}

impl UnixDatagramTransport {
    /// Bind a receiving socket at `path`.
    pub fn bind(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_socket(UnixDatagram::bind(path)?)
    }

    /// Create an unbound socket connected to the receiver at `path`.
    pub fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
        let socket = UnixDatagram::unbound()?;
        socket.connect(path)?;
        Self::from_socket(socket)
    }

    /// Create a connected pair of transports.
    pub fn pair() -> io::Result<(Self, Self)> {
        let (left, right) = UnixDatagram::pair()?;
        Ok((Self::from_socket(left)?, Self::from_socket(right)?))
    }

    /// Wrap an existing socket, switching it to non-blocking mode.
    pub fn from_socket(socket: UnixDatagram) -> io::Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            recv_buf: vec![0; DEFAULT_MAX_DATAGRAM_SIZE],
        })
    }

    /// Override the largest datagram accepted by `recv_nonblocking`.
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.recv_buf = vec![0; size];
        self
    }

    pub fn get_ref(&self) -> &UnixDatagram {
        &self.socket
    }

    pub fn into_inner(self) -> UnixDatagram {
        self.socket
    }
}

impl FrameSender for UnixDatagramTransport {
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()> {
        let sent = self.socket.send(frame)?;
        ensure_whole_datagram(sent, frame)
    }
}

impl FrameReceiver for UnixDatagramTransport {
    fn recv_nonblocking(&mut self) -> io::Result<Vec<u8>> {
        let len = self.socket.recv(&mut self.recv_buf)?;
        Ok(self.recv_buf[..len].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pair_moves_messages_both_ways() {
        let (mut left, mut right) = UnixDatagramTransport::pair().expect("pair");
        left.send_nonblocking(b"ping").expect("send");
        assert_eq!(right.recv_nonblocking().expect("recv"), b"ping");
        right.send_nonblocking(b"pong").expect("send");
        assert_eq!(left.recv_nonblocking().expect("recv"), b"pong");
    }

    #[rstest]
    fn saturated_socket_would_block() {
        let (mut left, _right) = UnixDatagramTransport::pair().expect("pair");
        let frame = vec![0u8; 1024];
        let err = (0..1_000_000)
            .find_map(|_| left.send_nonblocking(&frame).err())
            .expect("send buffer eventually fills");
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[rstest]
    fn bound_path_receives() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("outlog.sock");
        let mut receiver = UnixDatagramTransport::bind(&path).expect("bind");
        let mut sender = UnixDatagramTransport::connect(&path).expect("connect");
        sender.send_nonblocking(b"hello").expect("send");
        assert_eq!(receiver.recv_nonblocking().expect("recv"), b"hello");
    }
}
